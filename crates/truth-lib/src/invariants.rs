//! Invariant checks excluded from coverage reports.
//!
//! A failed check is a bug in the engine, never a problem in a document.

#![cfg_attr(coverage_nightly, coverage(off))]

#[inline]
pub(crate) fn ensure_not_root(length: usize) {
    assert!(length > 0, "broken phrase invariant: root phrases cannot be disposed");
}

#[inline]
pub(crate) fn ensure_real(is_hypothetical: bool, operation: &str) {
    assert!(
        !is_hypothetical,
        "broken phrase invariant: cannot {operation} a hypothetical phrase"
    );
}

#[inline]
pub(crate) fn ensure_new_edge(already_present: bool) {
    assert!(
        !already_present,
        "broken parallel invariant: edge already has a base"
    );
}

#[inline]
pub(crate) fn ensure_pattern(is_pattern: bool, expected: bool) {
    if expected {
        assert!(
            is_pattern,
            "broken parallel invariant: pattern bases require a pattern subject"
        );
    } else {
        assert!(
            !is_pattern,
            "broken parallel invariant: literal bases cannot target a pattern subject"
        );
    }
}

#[inline]
pub(crate) fn ensure_bridgeable(already_bridged: bool, same_polarity: bool) {
    assert!(!already_bridged, "broken parallel invariant: already bridged");
    assert!(
        !same_polarity,
        "broken parallel invariant: bridged parallels must differ in list-ness"
    );
}

#[inline]
pub(crate) fn ensure_unseeded(seeded: bool) {
    assert!(!seeded, "broken type invariant: type seeded twice");
}

#[inline]
pub(crate) fn ensure_seeded(seeded: bool) {
    assert!(
        seeded,
        "broken type invariant: type could not be materialized from a live phrase"
    );
}
