//! One pipeline cycle per camera frame.
//!
//! A cycle acquires a frame, optionally searches it for the target blob, runs
//! the tracker, estimates the global motion and, when motion is detected,
//! masks the moving regions and hands the motion to the actuation sink. The
//! frame goes back to its source when the cycle ends, whatever the outcome.

use serde::Serialize;
use vistrack_image::ImageSize;
use vistrack_imgproc::{
    schedule::CooperativeYield,
    segment::{draw_blob, Blob, ColorSegmenter},
};

use crate::{
    config::PipelineConfig,
    error::TrackerError,
    masking::MotionMasker,
    motion::{MotionEstimate, MotionEstimator},
    overlay::draw_tracker_flow,
    source::{AcquiredFrame, ActuationSink, FrameSource},
    tracker::OpticalFlowTracker,
};

/// The results of one cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CycleReport {
    /// 1-based index of the processed frame.
    pub frame_index: u64,
    /// The blob search result, if a search ran this cycle.
    pub blob: Option<Blob>,
    /// Whether the blob passed the filter and was sent to the sink.
    pub blob_accepted: bool,
    /// Whether the tracker seeded or re-seeded its features.
    pub reseeded: bool,
    /// Valid features after the tracker update.
    pub valid_features: usize,
    /// The global motion.
    pub motion: MotionEstimate,
    /// Pixels overwritten by the motion mask.
    pub masked_pixels: usize,
}

/// All stages of the vision pipeline for one camera session.
pub struct VisionPipeline {
    config: PipelineConfig,
    segmenter: ColorSegmenter,
    tracker: OpticalFlowTracker,
    estimator: MotionEstimator,
    masker: MotionMasker,
    frame_count: u64,
}

impl VisionPipeline {
    /// Create the pipeline for frames of `size`.
    pub fn new(size: ImageSize, config: PipelineConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            segmenter: ColorSegmenter::new(config.segmenter),
            tracker: OpticalFlowTracker::new(size, config.tracker)?,
            estimator: MotionEstimator::new(config.tracker.motion_threshold),
            masker: MotionMasker::new(config.mask),
            frame_count: 0,
            config,
        })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The tracker.
    pub fn tracker(&self) -> &OpticalFlowTracker {
        &self.tracker
    }

    /// The tracker, for removing features or resetting it.
    pub fn tracker_mut(&mut self) -> &mut OpticalFlowTracker {
        &mut self.tracker
    }

    /// Number of frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run one cycle on the next frame of `source`.
    ///
    /// Returns `Ok(None)` when the source has no frame. Blob search, masking
    /// and overlay failures are logged and skipped; tracker failures abort the
    /// cycle. The frame is released back to `source` in every case.
    pub fn run_cycle<S, A, Y>(
        &mut self,
        source: &mut S,
        sink: &mut A,
        yielder: &mut Y,
    ) -> Result<Option<CycleReport>, TrackerError>
    where
        S: FrameSource + ?Sized,
        A: ActuationSink + ?Sized,
        Y: CooperativeYield + ?Sized,
    {
        let Some(mut frame) = AcquiredFrame::acquire(source) else {
            log::debug!("no frame available");
            return Ok(None);
        };

        self.frame_count += 1;
        let control = &self.config.control;
        let mut report = CycleReport {
            frame_index: self.frame_count,
            ..Default::default()
        };

        if control.blob_every_frames != 0 && self.frame_count % control.blob_every_frames == 0 {
            match self.segmenter.detect(&frame, &control.target, yielder) {
                Ok(blob) => {
                    report.blob = Some(blob);
                    if control.blob_filter.accepts(&blob) {
                        report.blob_accepted = true;
                        sink.on_blob(&blob, frame.size());
                        if control.draw_overlay {
                            if let Err(err) = draw_blob(&mut frame, &blob, control.blob_color) {
                                log::warn!("blob overlay skipped: {err}");
                            }
                        }
                    }
                }
                Err(err) => log::warn!("blob search skipped: {err}"),
            }
        }

        let outcome = self.tracker.update(&frame)?;
        report.reseeded = outcome.seeded || outcome.reseeded;
        report.valid_features = outcome.valid;

        report.motion = self.estimator.estimate(&self.tracker);
        if report.motion.motion_detected {
            match self.masker.apply(&mut frame, &self.tracker, yielder) {
                Ok(n) => report.masked_pixels = n,
                Err(err) => log::warn!("motion masking skipped: {err}"),
            }

            if !report.blob_accepted {
                sink.on_motion(&report.motion);
            }

            if control.draw_overlay {
                if let Err(err) = draw_tracker_flow(&mut frame, &self.tracker, control.flow_color)
                {
                    log::warn!("flow overlay skipped: {err}");
                }
            }
        }

        Ok(Some(report))
    }
}
