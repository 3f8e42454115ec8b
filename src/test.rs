//! Shared helpers for the crate's tests.

use std::iter::zip;

use crate::event::{EventType, InputEvent};

/// Routes `log` output into the test harness. Safe to call repeatedly.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Compares two events by type, code, and value, ignoring timestamps.
///
/// The value of `SYN` events is meaningless and also ignored.
pub fn events_eq(recv: InputEvent, expected: InputEvent) -> bool {
    if recv.event_type() != expected.event_type() || recv.raw_code() != expected.raw_code() {
        return false;
    }

    if recv.event_type() != EventType::SYN && recv.raw_value() != expected.raw_value() {
        return false;
    }
    true
}

#[track_caller]
pub fn check_events(
    actual: impl IntoIterator<Item = InputEvent>,
    expected: impl IntoIterator<Item = InputEvent>,
) {
    let actual: Vec<_> = actual.into_iter().collect();
    let expected: Vec<_> = expected.into_iter().collect();
    assert_eq!(
        actual.len(),
        expected.len(),
        "expected {} events, got {actual:?}",
        expected.len()
    );
    if !zip(actual.iter().copied(), expected.iter().copied()).all(|(a, b)| events_eq(a, b)) {
        panic!("expected {expected:?}, got {actual:?}");
    }
}
