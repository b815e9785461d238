//! Sparse feature tracking across consecutive frames.
//!
//! The tracker owns two grayscale buffers. Each update converts the incoming
//! frame into the current buffer, solves the flow of every live feature from
//! the previous buffer and then exchanges the two buffers, so no pixel data is
//! copied after the first frame.

use vistrack_image::{Frame, GrayImage, ImageError, ImageSize};
use vistrack_imgproc::{color::gray_from_frame, features::detect_corners};

use crate::{
    config::TrackerConfig,
    error::TrackerError,
    feature::{FeaturePoint, FeatureTable, FlowVector},
    lucas_kanade::solve_table,
};

/// The lifecycle state of an [`OpticalFlowTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No frame has been seen since construction or the last reset.
    Uninitialized,
    /// Features are being tracked.
    Tracking,
    /// The buffers have been released.
    Released,
}

/// What happened during an update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The table was seeded from scratch because this was the first frame.
    pub seeded: bool,
    /// Too few features survived and the table was re-seeded.
    pub reseeded: bool,
    /// Valid features after the update.
    pub valid: usize,
}

struct FrameBuffers {
    prev: GrayImage,
    curr: GrayImage,
}

/// Tracks a bounded set of Harris corners with single-shot Lucas-Kanade flow.
///
/// # Example
///
/// ```
/// use vistrack_image::{Frame, ImageSize};
/// use vistrack_tracking::{config::TrackerConfig, OpticalFlowTracker};
///
/// let size = ImageSize { width: 64, height: 48 };
/// let mut tracker = OpticalFlowTracker::new(size, TrackerConfig::default()).unwrap();
///
/// let frame = Frame::gray8(size, vec![0; size.area()]).unwrap();
/// let outcome = tracker.update(&frame).unwrap();
/// assert!(outcome.seeded);
/// ```
pub struct OpticalFlowTracker {
    config: TrackerConfig,
    size: ImageSize,
    buffers: Option<FrameBuffers>,
    table: FeatureTable,
    state: TrackingState,
}

impl OpticalFlowTracker {
    /// Create a tracker for frames of `size`, allocating both grayscale buffers.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] for unusable parameters, and an
    /// image error for a zero size or when the buffers cannot be allocated.
    pub fn new(size: ImageSize, config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;

        let buffers = FrameBuffers {
            prev: GrayImage::from_size_val(size, 0)?,
            curr: GrayImage::from_size_val(size, 0)?,
        };
        let table = FeatureTable::new(config.capacity)?;

        log::info!(
            "optical flow tracker created for {} frames with capacity {}",
            size,
            config.capacity
        );

        Ok(Self {
            config,
            size,
            buffers: Some(buffers),
            table,
            state: TrackingState::Uninitialized,
        })
    }

    /// Process a new frame.
    ///
    /// The first frame seeds the feature table. Every following frame moves
    /// the features by their flow, drops the ones that failed or drifted
    /// towards an edge and re-seeds when too few remain.
    ///
    /// # Errors
    ///
    /// Fails without touching the tracker state when the frame size differs
    /// from the tracker size, and with [`TrackerError::Released`] after
    /// [`Self::deinit`].
    pub fn update(&mut self, frame: &Frame) -> Result<UpdateOutcome, TrackerError> {
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(TrackerError::Released);
        };

        if frame.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                frame.width(),
                frame.height(),
                self.size.width,
                self.size.height,
            )
            .into());
        }

        gray_from_frame(frame, &mut buffers.curr)?;

        if self.state == TrackingState::Uninitialized {
            seed(&mut self.table, &buffers.curr, &self.config);
            buffers.prev.as_slice_mut().copy_from_slice(buffers.curr.as_slice());
            self.state = TrackingState::Tracking;

            log::info!(
                "optical flow tracker initialized with {} features",
                self.table.len()
            );

            return Ok(UpdateOutcome {
                seeded: true,
                reseeded: false,
                valid: self.table.valid_count(),
            });
        }

        solve_table(
            &buffers.prev,
            &buffers.curr,
            &mut self.table,
            self.config.window_size,
        )?;

        let valid = advance_features(&mut self.table, self.size, &self.config);

        let reseeded = valid < self.config.reseed_below();
        if reseeded {
            seed(&mut self.table, &buffers.curr, &self.config);
            log::debug!(
                "re-seeded after {} valid features survived, {} features",
                valid,
                self.table.len()
            );
        }

        std::mem::swap(&mut buffers.prev, &mut buffers.curr);

        Ok(UpdateOutcome {
            seeded: false,
            reseeded,
            valid: self.table.valid_count(),
        })
    }

    /// Forget every feature and wait for a new first frame.
    pub fn reset(&mut self) -> Result<(), TrackerError> {
        if self.buffers.is_none() {
            return Err(TrackerError::Released);
        }
        self.table.clear();
        self.state = TrackingState::Uninitialized;
        Ok(())
    }

    /// Release both grayscale buffers. Calling it again has no effect.
    pub fn deinit(&mut self) {
        if self.buffers.take().is_some() {
            log::info!("optical flow tracker released");
        }
        self.table.clear();
        self.state = TrackingState::Released;
    }

    /// Remove the features at `indices` together with their flows.
    pub fn remove_features(&mut self, indices: &[usize]) {
        self.table.remove(indices);
    }

    /// The lifecycle state.
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Whether the first frame has been processed.
    pub fn is_initialized(&self) -> bool {
        self.state == TrackingState::Tracking
    }

    /// The frame size fixed at construction.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The tracker parameters.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The maximum number of features.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// The feature and flow table.
    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    /// The features.
    pub fn features(&self) -> &[FeaturePoint] {
        self.table.features()
    }

    /// The flows of the last update, index-aligned with [`Self::features`].
    pub fn flows(&self) -> &[FlowVector] {
        self.table.flows()
    }

    /// The grayscale version of the last processed frame.
    pub fn last_gray(&self) -> Option<&GrayImage> {
        match (&self.buffers, self.state) {
            (Some(buffers), TrackingState::Tracking) => Some(&buffers.prev),
            _ => None,
        }
    }
}

/// Replace the table with corners detected in `gray`.
///
/// A failed detection leaves the table empty so the next update tries again.
fn seed(table: &mut FeatureTable, gray: &GrayImage, config: &TrackerConfig) {
    match detect_corners(gray, &config.corner, config.capacity) {
        Ok(corners) => table.reseed(&corners),
        Err(err) => {
            log::warn!("feature seeding skipped: {err}");
            table.clear();
        }
    }
}

/// Move every tracked feature by its flow and return how many stay valid.
fn advance_features(table: &mut FeatureTable, size: ImageSize, config: &TrackerConfig) -> usize {
    let margin = config.edge_margin;
    let x_max = size.width as f32 - margin;
    let y_max = size.height as f32 - margin;

    let mut valid = 0;
    for (feature, flow) in table.entries_mut() {
        if !(flow.tracked && flow.error < config.max_flow_magnitude) {
            feature.valid = false;
            continue;
        }

        feature.x += flow.dx;
        feature.y += flow.dy;

        if feature.x < margin || feature.x >= x_max || feature.y < margin || feature.y >= y_max {
            feature.valid = false;
        } else {
            valid += 1;
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(size: ImageSize, value: u8) -> Result<Frame, ImageError> {
        Frame::gray8(size, vec![value; size.area()])
    }

    #[test]
    fn rejects_other_sizes() -> Result<(), TrackerError> {
        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let mut tracker = OpticalFlowTracker::new(size, TrackerConfig::default())?;
        let res = tracker.update(&frame([64, 40].into(), 0)?);
        assert!(matches!(
            res,
            Err(TrackerError::Image(ImageError::InvalidImageSize(64, 40, 64, 48)))
        ));
        assert_eq!(tracker.state(), TrackingState::Uninitialized);
        Ok(())
    }

    #[test]
    fn zero_size_rejected() {
        let res = OpticalFlowTracker::new([0, 10].into(), TrackerConfig::default());
        assert!(matches!(
            res,
            Err(TrackerError::Image(ImageError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = TrackerConfig {
            window_size: 6,
            ..Default::default()
        };
        let res = OpticalFlowTracker::new([64, 48].into(), config);
        assert!(matches!(res, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn constant_frames_have_no_features() -> Result<(), TrackerError> {
        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let mut tracker = OpticalFlowTracker::new(size, TrackerConfig::default())?;
        let first = tracker.update(&frame(size, 128)?)?;
        assert!(first.seeded);
        assert_eq!(first.valid, 0);
        assert!(tracker.is_initialized());
        assert!(tracker.features().is_empty());

        // nothing survives, so every later update re-seeds
        let second = tracker.update(&frame(size, 128)?)?;
        assert!(second.reseeded);
        assert!(tracker.features().is_empty());
        Ok(())
    }

    #[test]
    fn last_gray_follows_lifecycle() -> Result<(), TrackerError> {
        let size = ImageSize {
            width: 32,
            height: 24,
        };
        let mut tracker = OpticalFlowTracker::new(size, TrackerConfig::default())?;
        assert!(tracker.last_gray().is_none());

        tracker.update(&Frame::rgb565(size, vec![0xFFFF; size.area()])?)?;
        let gray = tracker.last_gray().ok_or(TrackerError::Released)?;
        assert!(gray.as_slice().iter().all(|&v| v == 250));

        tracker.update(&frame(size, 17)?)?;
        let gray = tracker.last_gray().ok_or(TrackerError::Released)?;
        assert!(gray.as_slice().iter().all(|&v| v == 17));

        tracker.deinit();
        assert!(tracker.last_gray().is_none());
        Ok(())
    }

    #[test]
    fn deinit_is_idempotent() -> Result<(), TrackerError> {
        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let mut tracker = OpticalFlowTracker::new(size, TrackerConfig::default())?;
        tracker.deinit();
        tracker.deinit();
        assert_eq!(tracker.state(), TrackingState::Released);
        assert!(matches!(
            tracker.update(&frame(size, 0)?),
            Err(TrackerError::Released)
        ));
        assert!(matches!(tracker.reset(), Err(TrackerError::Released)));
        Ok(())
    }

    #[test]
    fn advance_drops_failed_and_edge_features() -> Result<(), TrackerError> {
        let size = ImageSize {
            width: 100,
            height: 100,
        };
        let config = TrackerConfig::default();
        let mut table = FeatureTable::new(4)?;
        table.reseed(&[
            vistrack_imgproc::features::Corner {
                x: 50,
                y: 50,
                response: 1.0,
            };
            4
        ]);
        let flows = [
            FlowVector::tracked(1.5, -0.5),
            FlowVector::tracked(9.0, 5.0),
            FlowVector::UNTRACKED,
            FlowVector::tracked(-8.0, 0.0),
        ];
        for ((feature, flow), new_flow) in table.entries_mut().zip(flows) {
            *flow = new_flow;
            if new_flow.dx < 0.0 && new_flow.dy == 0.0 {
                feature.x = 17.0;
            }
        }

        let valid = advance_features(&mut table, size, &config);
        assert_eq!(valid, 1);
        let features = table.features();
        assert!(features[0].valid);
        assert_eq!((features[0].x, features[0].y), (51.5, 49.5));
        // magnitude above the limit
        assert!(!features[1].valid);
        assert!(!features[2].valid);
        // moved to x = 9, inside the edge margin
        assert!(!features[3].valid);
        Ok(())
    }
}
