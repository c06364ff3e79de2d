use crate::{VersionClock, VersionStamp};

#[test]
fn clock_starts_at_initial() {
    let clock = VersionClock::new();
    assert_eq!(clock.now(), VersionStamp::INITIAL);
}

#[test]
fn tick_is_monotonic() {
    let mut clock = VersionClock::new();
    let first = clock.now();
    let second = clock.tick();
    let third = clock.tick();

    assert!(second.newer_than(first));
    assert!(third.newer_than(second));
    assert!(!first.newer_than(third));
    assert!(!second.newer_than(second));
}

#[test]
fn display() {
    let mut clock = VersionClock::new();
    clock.tick();
    insta::assert_snapshot!(clock.now().to_string(), @"v1");
}
