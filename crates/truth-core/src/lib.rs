#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Truth engine and its front ends.
//!
//! - `interner`: term deduplication into cheap `Symbol` handles
//! - `syntax`: the reserved tokens of the language
//! - `version`: monotonic stamps that order program edits

pub mod interner;
pub mod syntax;
pub mod version;

#[cfg(test)]
mod version_tests;

pub use interner::{Interner, Symbol};
pub use version::{VersionClock, VersionStamp};
