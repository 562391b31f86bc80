use super::*;

#[test]
fn timeout_exactly_at_tap_timeout_turns_touch_into_hold() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    assert_eq!(engine.timer_deadline_us(), Some(180 * MS));

    let buttons = engine.handle_timeout(180 * MS);
    assert!(buttons.is_empty());
    assert_eq!(engine.state(), TapState::Hold);
    assert_eq!(engine.timer_deadline_us(), None);

    // A held finger never clicks.
    let out = engine.handle_frame(&frame(&[end()], 0, 1), 250 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn motion_exactly_at_threshold_does_not_kill_tap() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin_at(0.0, 0.0)], 1, 0), 0);

    // Threshold semantics are strictly greater-than.
    let _ = engine.handle_frame(&frame(&[update_at(1.3, 0.0)], 1, 1), 20 * MS);
    assert_eq!(engine.state(), TapState::Touch);

    let out = engine.handle_frame(&frame(&[end()], 0, 1), 50 * MS);
    assert_eq!(out.buttons.as_slice(), &[pressed(0, PointerButton::Left)]);
}

#[test]
fn motion_just_above_threshold_kills_tap() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin_at(0.0, 0.0)], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[update_at(1.31, 0.0)], 1, 1), 20 * MS);
    assert_eq!(engine.state(), TapState::Dead);
}

#[test]
fn count_is_capped_at_three_fingers() {
    for (num_touches, want) in [(1, 1), (2, 2), (3, 3), (5, 3)] {
        let engine = TapEngine::new(DeviceCaps {
            num_touches,
            num_slots: num_touches,
            ..DeviceCaps::default()
        });
        assert_eq!(engine.count(), want);
    }
}

#[test]
fn no_press_is_emitted_after_motion_until_idle() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[update_at(15.0, 10.0)], 1, 1), 20 * MS);
    assert_eq!(engine.state(), TapState::Dead);

    // A second finger during the dead period contributes nothing.
    let out = engine.handle_frame(&frame(&[slot(), begin_at(30.0, 10.0)], 2, 1), 30 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Dead);

    let out = engine.handle_frame(&frame(&[slot(), end()], 1, 2), 50 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Dead);

    // Only once every finger lifts does the machine recover.
    let out = engine.handle_frame(&frame(&[end(), slot()], 0, 1), 60 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn map_switch_is_deferred_until_idle() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(30.0, 10.0)], 2, 1), 5 * MS);

    engine.set_map(ButtonMap::Lmr);
    assert_eq!(engine.map(), ButtonMap::Lmr);
    assert_eq!(engine.active_map(), ButtonMap::Lrm);

    // The in-flight two-finger tap still resolves through the old map.
    let _ = engine.handle_frame(&frame(&[end(), slot()], 1, 2), 40 * MS);
    let out = engine.handle_frame(&frame(&[slot(), end()], 0, 1), 42 * MS);
    assert_eq!(
        out.buttons.as_slice(),
        &[
            pressed(5 * MS, PointerButton::Right),
            released(40 * MS, PointerButton::Right),
        ]
    );

    engine.post_process();
    assert_eq!(engine.active_map(), ButtonMap::Lmr);

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 500 * MS);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(30.0, 10.0)], 2, 1), 505 * MS);
    let _ = engine.handle_frame(&frame(&[end(), slot()], 1, 2), 540 * MS);
    let out = engine.handle_frame(&frame(&[slot(), end()], 0, 1), 542 * MS);
    assert_eq!(
        out.buttons.as_slice(),
        &[
            pressed(505 * MS, PointerButton::Middle),
            released(540 * MS, PointerButton::Middle),
        ]
    );
}

#[test]
fn suspend_balances_outstanding_press_and_ignores_input() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let out = engine.handle_frame(&frame(&[end()], 0, 1), 50 * MS);
    assert_eq!(out.buttons.as_slice(), &[pressed(0, PointerButton::Left)]);
    assert_eq!(engine.state(), TapState::Tapped);

    let buttons = engine.suspend(1_000 * MS);
    assert_eq!(
        buttons.as_slice(),
        &[released(1_000 * MS, PointerButton::Left)]
    );
    assert_eq!(engine.state(), TapState::Idle);
    assert_eq!(engine.timer_deadline_us(), None);

    let out = engine.handle_frame(&frame(&[begin()], 1, 0), 1_100 * MS);
    assert!(out.buttons.is_empty());
    assert!(!out.filter_motion);
    assert_eq!(engine.state(), TapState::Idle);

    let buttons = engine.resume(2_000 * MS);
    assert!(buttons.is_empty());

    // The touch that began while suspended stays neutralized; a fresh tap
    // works normally.
    let _ = engine.handle_frame(&frame(&[end()], 0, 1), 2_050 * MS);
    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 2_100 * MS);
    let out = engine.handle_frame(&frame(&[end()], 0, 1), 2_150 * MS);
    assert_eq!(
        out.buttons.as_slice(),
        &[pressed(2_100 * MS, PointerButton::Left)]
    );
}

#[test]
fn palm_during_two_finger_release_reuses_last_press_time() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(30.0, 10.0)], 2, 1), 5 * MS);
    let _ = engine.handle_frame(&frame(&[end(), slot()], 1, 2), 30 * MS);
    assert_eq!(engine.state(), TapState::Touch2Release);

    // The surviving contact is demoted to a palm. Only one press time is
    // saved, so the single-finger press is dated at the palm's own
    // touch-down, not the finger's.
    let palm = FrameTouch {
        palm_detected: true,
        ..update_at(30.0, 10.0)
    };
    let out = engine.handle_frame(&frame(&[slot(), palm], 1, 1), 40 * MS);
    assert_eq!(
        out.buttons.as_slice(),
        &[pressed(5 * MS, PointerButton::Left)]
    );
    assert_eq!(engine.state(), TapState::Tapped);

    let buttons = engine.handle_timeout(220 * MS);
    assert_eq!(buttons.as_slice(), &[released(40 * MS, PointerButton::Left)]);
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn three_finger_release_of_dead_touch_emits_nothing() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(25.0, 10.0)], 2, 1), 5 * MS);
    let _ = engine.handle_frame(&frame(&[end(), slot()], 1, 2), 10 * MS);
    assert_eq!(engine.state(), TapState::Touch2Release);

    // A touch landing during the release window is dead on arrival.
    let _ = engine.handle_frame(&frame(&[slot(), slot(), begin_at(40.0, 10.0)], 2, 1), 20 * MS);
    assert_eq!(engine.state(), TapState::Touch2Hold);

    let _ = engine.handle_frame(
        &frame(&[slot(), slot(), slot(), begin_at(55.0, 10.0)], 3, 2),
        30 * MS,
    );
    assert_eq!(engine.state(), TapState::Touch3);

    // Releasing the dead touch must not click.
    let out = engine.handle_frame(&frame(&[slot(), slot(), end(), slot()], 2, 3), 40 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Touch2Hold);
}

#[test]
fn synaptics_serial_ignores_jumps_with_more_fingers_than_slots() {
    let mut engine = TapEngine::new(DeviceCaps {
        num_touches: 5,
        num_slots: 2,
        synaptics_serial: true,
        ..DeviceCaps::default()
    });

    let _ = engine.handle_frame(&frame(&[begin_at(0.0, 0.0)], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(10.0, 0.0)], 2, 1), 5 * MS);
    let _ = engine.handle_frame(&frame(&[slot(), slot(), begin_at(20.0, 0.0)], 3, 2), 10 * MS);
    assert_eq!(engine.state(), TapState::Touch3);

    // A 5 mm jump with three fingers on a two-slot pad is reporting noise.
    let _ = engine.handle_frame(&frame(&[update_at(5.0, 0.0)], 3, 3), 20 * MS);
    assert_eq!(engine.state(), TapState::Touch3);
}

#[test]
fn semi_mt_ignores_motion_in_finger_change_frames() {
    let mut engine = TapEngine::new(DeviceCaps {
        num_touches: 2,
        num_slots: 2,
        semi_mt: true,
        ..DeviceCaps::default()
    });

    let _ = engine.handle_frame(&frame(&[begin_at(0.0, 0.0)], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(10.0, 0.0)], 2, 1), 5 * MS);

    // The bounding box collapses when the second finger lifts; the same
    // frame must not register as tap-killing motion.
    let out = engine.handle_frame(&frame(&[update_at(5.0, 0.0), end()], 1, 2), 30 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Touch2Release);

    // With a stable finger count the same jump kills the tap.
    let _ = engine.handle_frame(&frame(&[update_at(8.0, 0.0), slot()], 1, 1), 40 * MS);
    assert_eq!(engine.state(), TapState::Dead);
}

#[test]
fn clickpad_button_press_kills_tap_without_buttons() {
    let mut engine = TapEngine::new(DeviceCaps {
        num_touches: 5,
        num_slots: 5,
        is_clickpad: true,
        ..DeviceCaps::default()
    });

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);

    let mut click = frame(&[update_at(10.0, 10.0)], 1, 1);
    click.button_press_queued = true;
    let out = engine.handle_frame(&click, 10 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Dead);
    assert_eq!(engine.timer_deadline_us(), None);

    let out = engine.handle_frame(&frame(&[end()], 0, 1), 30 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn thumb_on_begin_never_enters_the_machine() {
    let mut engine = engine();

    let thumb = FrameTouch {
        thumb_on_begin: true,
        ..begin()
    };
    let out = engine.handle_frame(&frame(&[thumb], 1, 0), 0);
    assert!(out.buttons.is_empty());
    assert!(!out.filter_motion);
    assert_eq!(engine.state(), TapState::Idle);

    let out = engine.handle_frame(&frame(&[end()], 0, 1), 50 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn thumb_reclassification_unwinds_single_touch() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);

    let thumb = FrameTouch {
        thumb_in_progress: true,
        ..update_at(10.0, 10.0)
    };
    let out = engine.handle_frame(&frame(&[thumb], 1, 1), 20 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
    assert_eq!(engine.timer_deadline_us(), None);

    // The thumb's lift is ignored entirely.
    let out = engine.handle_frame(&frame(&[end()], 0, 1), 50 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn palm_like_initial_touch_is_killed_at_begin() {
    let mut engine = engine();

    let palm_tap = FrameTouch {
        palm_on_begin: true,
        ..begin()
    };
    let out = engine.handle_frame(&frame(&[palm_tap], 1, 0), 0);
    assert!(out.buttons.is_empty());
    assert!(!out.filter_motion);
    assert_eq!(engine.state(), TapState::Dead);

    let out = engine.handle_frame(&frame(&[end()], 0, 1), 30 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn tapping_defaults_off_with_a_physical_left_button() {
    let with_button = DeviceCaps {
        num_touches: 5,
        num_slots: 5,
        has_left_button: true,
        ..DeviceCaps::default()
    };
    assert!(!TapEngine::default_enabled(&with_button));
    assert!(TapEngine::default_enabled(&caps()));

    let mut engine = TapEngine::new(with_button);
    let out = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);

    let buttons = engine.set_enabled(true, 10 * MS);
    assert!(buttons.is_empty());
    let _ = engine.handle_frame(&frame(&[end()], 0, 1), 20 * MS);
    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 100 * MS);
    let out = engine.handle_frame(&frame(&[end()], 0, 1), 150 * MS);
    assert_eq!(
        out.buttons.as_slice(),
        &[pressed(100 * MS, PointerButton::Left)]
    );
}

#[test]
fn disabling_mid_drag_releases_the_held_button() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[end()], 0, 1), 30 * MS);
    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 60 * MS);
    let _ = engine.handle_frame(&frame(&[update_at(12.0, 10.0)], 1, 1), 100 * MS);
    assert!(engine.dragging());

    let buttons = engine.set_enabled(false, 200 * MS);
    assert_eq!(
        buttons.as_slice(),
        &[released(200 * MS, PointerButton::Left)]
    );
    assert_eq!(engine.state(), TapState::Idle);
    assert_eq!(engine.timer_deadline_us(), None);
}

#[test]
fn timeout_disqualifies_remaining_candidates() {
    let mut engine = engine();

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 0);
    let _ = engine.handle_frame(&frame(&[slot(), begin_at(30.0, 10.0)], 2, 1), 5 * MS);
    assert_eq!(engine.state(), TapState::Touch2);

    let buttons = engine.handle_timeout(185 * MS);
    assert!(buttons.is_empty());
    assert_eq!(engine.state(), TapState::Touch2Hold);

    // Both touches were promoted to dead; their releases cannot click.
    let _ = engine.handle_frame(&frame(&[end(), slot()], 1, 2), 200 * MS);
    let out = engine.handle_frame(&frame(&[slot(), end()], 0, 1), 210 * MS);
    assert!(out.buttons.is_empty());
    assert_eq!(engine.state(), TapState::Idle);
}

#[test]
fn trace_records_the_last_transition() {
    let mut engine = engine();
    assert!(engine.last_transition().is_none());

    let _ = engine.handle_frame(&frame(&[begin()], 1, 0), 7 * MS);
    let sample = engine.last_transition().unwrap();
    assert_eq!(sample.from, TapState::Idle);
    assert_eq!(sample.to, TapState::Touch);
    assert_eq!(sample.event, TapEvent::Touch);
    assert_eq!(sample.touch, Some(0));
    assert_eq!(sample.time_us, 7 * MS);
    assert_eq!(sample.nfingers_down, 1);
}
