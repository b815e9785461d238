use serde::{Deserialize, Serialize};

use crate::tracker::OpticalFlowTracker;

/// The global motion between the last two frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEstimate {
    /// Mean horizontal flow.
    pub motion_x: f32,
    /// Mean vertical flow.
    pub motion_y: f32,
    /// Fraction of the tracker capacity that contributed.
    pub confidence: f32,
    /// Number of contributing features.
    pub tracked_points: usize,
    /// Whether the mean flow is large enough to count as motion.
    pub motion_detected: bool,
}

impl MotionEstimate {
    /// Length of the mean flow.
    pub fn magnitude(&self) -> f32 {
        (self.motion_x * self.motion_x + self.motion_y * self.motion_y).sqrt()
    }
}

/// Averages the flow of the tracked features.
#[derive(Debug, Clone, Copy)]
pub struct MotionEstimator {
    threshold: f32,
}

impl Default for MotionEstimator {
    fn default() -> Self {
        Self { threshold: 1.0 }
    }
}

impl MotionEstimator {
    /// Create an estimator flagging motion above `threshold` pixels per frame.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Aggregate the flows of the last tracker update.
    ///
    /// Only features that are valid and were tracked contribute. An
    /// uninitialized tracker, or one with no contributing feature, yields an
    /// all-zero estimate.
    pub fn estimate(&self, tracker: &OpticalFlowTracker) -> MotionEstimate {
        if !tracker.is_initialized() {
            return MotionEstimate::default();
        }

        let (sum_x, sum_y, count) = tracker
            .table()
            .iter()
            .filter(|(feature, flow)| feature.valid && flow.tracked)
            .fold((0.0f32, 0.0f32, 0usize), |(sx, sy, n), (_, flow)| {
                (sx + flow.dx, sy + flow.dy, n + 1)
            });

        if count == 0 {
            return MotionEstimate::default();
        }

        let mut estimate = MotionEstimate {
            motion_x: sum_x / count as f32,
            motion_y: sum_y / count as f32,
            confidence: count as f32 / tracker.capacity() as f32,
            tracked_points: count,
            motion_detected: false,
        };
        estimate.motion_detected = estimate.magnitude() > self.threshold;

        log::debug!(
            "motion: dx={:.2}, dy={:.2}, points={}, confidence={:.2}",
            estimate.motion_x,
            estimate.motion_y,
            estimate.tracked_points,
            estimate.confidence
        );

        estimate
    }
}
