//! Corner detection for seeding sparse trackers.
//!
//! The detector evaluates the Harris structure-tensor response on a fixed,
//! row-major grid of candidate points rather than on every pixel, so the cost
//! is bounded by the grid and the requested capacity.

mod harris;
pub use harris::*;
