use super::*;
use drillbot_protocols::FREEZE_MESSAGE_TYPE;
use serde_json::json;

fn clock() -> MainWorldClock<ManualClock> {
    MainWorldClock::new(ManualClock::new(1_700_000_000_000.0))
}

#[test]
fn test_passthrough_follows_real_clock() {
    let clock = clock();
    let before = clock.date_now();
    clock.source().advance_ms(250.0);
    assert_eq!(clock.date_now(), before + 250.0);
    assert_eq!(clock.performance_now(), 250.0);
}

#[test]
fn test_frozen_clock_is_constant() {
    let clock = clock();
    clock.source().advance_ms(40.0);
    clock.freeze();

    let wall = clock.date_now();
    let mono = clock.performance_now();
    clock.source().advance_ms(5_000.0);

    assert_eq!(clock.date_now(), wall);
    assert_eq!(clock.performance_now(), mono);
}

#[test]
fn test_second_freeze_keeps_first_snapshot() {
    let clock = clock();
    clock.freeze();
    let wall = clock.date_now();

    clock.source().advance_ms(1_000.0);
    clock.freeze();
    assert_eq!(clock.date_now(), wall);
}

#[test]
fn test_unfreeze_returns_to_real_time() {
    let clock = clock();
    clock.freeze();
    clock.source().advance_ms(1_000.0);
    clock.unfreeze();

    assert!(!clock.is_frozen());
    assert_eq!(clock.date_now(), clock.source().wall_ms());
    assert_eq!(clock.performance_now(), 1_000.0);
}

#[test]
fn test_window_messages_drive_the_freeze() {
    let clock = clock();
    assert!(clock.handle_window_message(&json!({"type": FREEZE_MESSAGE_TYPE, "enabled": true})));
    assert!(clock.is_frozen());

    assert!(!clock.handle_window_message(&json!({"type": "SOMETHING_ELSE", "enabled": false})));
    assert!(clock.is_frozen());

    assert!(clock.handle_window_message(&json!({"type": FREEZE_MESSAGE_TYPE, "enabled": false})));
    assert_eq!(clock.provider(), ClockProvider::Passthrough);
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock::new();
    let a = clock.monotonic_ms();
    let b = clock.monotonic_ms();
    assert!(b >= a);
    assert!(clock.wall_ms() > 0.0);
}
