#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color conversions for packed 5-6-5 frames.
pub mod color;

/// masked pixel replacement.
pub mod core;

/// utilities to draw on images.
pub mod draw;

/// feature detection module.
pub mod features;

/// central-difference image gradients.
pub mod gradient;

/// cooperative scheduling hooks for long pixel scans.
pub mod schedule;

/// color blob segmentation.
pub mod segment;

/// channel-wise color thresholds.
pub mod threshold;
