#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//! The tracker keeps a bounded table of Harris corners alive across frames with
//! a single-shot Lucas-Kanade solve, aggregates their flow into a global motion
//! estimate and feeds blobs and motion to an actuation sink.

/// configuration surface for the whole pipeline.
pub mod config;

/// pan/tilt actuation mapping.
pub mod control;

/// Error types for the tracking module.
pub mod error;

/// feature points, flow vectors and the bounded feature table.
pub mod feature;

/// single-shot Lucas-Kanade flow solve.
pub mod lucas_kanade;

/// motion region masking and compositing.
pub mod masking;

/// global motion aggregation.
pub mod motion;

/// debug drawing of tracked features.
pub mod overlay;

/// per-frame orchestration of all stages.
pub mod pipeline;

/// frame acquisition and actuation interfaces.
pub mod source;

/// the optical flow tracker.
pub mod tracker;

pub use crate::config::PipelineConfig;
pub use crate::error::TrackerError;
pub use crate::motion::{MotionEstimate, MotionEstimator};
pub use crate::tracker::OpticalFlowTracker;
