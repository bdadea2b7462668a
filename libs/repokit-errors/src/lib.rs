//! Boundary error shapes for repokit.
//!
//! Pure data: no HTTP framework is involved. Library errors convert into a
//! [`Problem`] at the edge (CLI, HTTP adapter, message handler).
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod problem;

pub use problem::{Problem, ValidationViolation};

