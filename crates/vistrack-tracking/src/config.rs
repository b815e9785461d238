//! Configuration for the tracker, the masker and the actuation stage.
//!
//! Every struct deserializes with `#[serde(default)]`, so a document only needs
//! the values it changes:
//!
//! ```
//! use vistrack_tracking::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{ "tracker": { "capacity": 32 } }"#).unwrap();
//! assert_eq!(config.tracker.capacity, 32);
//! assert_eq!(config.tracker.window_size, 5);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use vistrack_imgproc::{
    color::{RGB565_GREEN, RGB565_WHITE},
    features::CornerConfig,
    segment::{BlobFilter, SegmenterConfig},
    threshold::ColorThreshold,
};

use crate::error::TrackerError;

/// Parameters of the optical flow tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of features tracked at once.
    pub capacity: usize,
    /// Side of the square Lucas-Kanade window. Must be odd and at least 3.
    pub window_size: usize,
    /// The table is re-seeded when fewer than `capacity / reseed_divisor` features survive.
    pub reseed_divisor: usize,
    /// Flows with a magnitude at or above this drop the feature.
    pub max_flow_magnitude: f32,
    /// Features closer than this to an edge after moving are dropped.
    pub edge_margin: f32,
    /// A mean flow magnitude strictly above this counts as motion.
    pub motion_threshold: f32,
    /// Corner detector used for seeding.
    pub corner: CornerConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            window_size: 5,
            reseed_divisor: 3,
            max_flow_magnitude: 10.0,
            edge_margin: 10.0,
            motion_threshold: 1.0,
            corner: CornerConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Check the values the tracker cannot work with.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.capacity == 0 {
            return Err(TrackerError::InvalidConfig(
                "tracker capacity must be greater than zero".to_string(),
            ));
        }
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(TrackerError::InvalidConfig(format!(
                "window size must be odd and at least 3, got {}",
                self.window_size
            )));
        }
        if self.reseed_divisor == 0 {
            return Err(TrackerError::InvalidConfig(
                "re-seed divisor must be greater than zero".to_string(),
            ));
        }
        if self.corner.grid_stride == 0 {
            return Err(TrackerError::InvalidConfig(
                "corner grid stride must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The number of surviving features below which the table is re-seeded.
    pub fn reseed_below(&self) -> usize {
        self.capacity / self.reseed_divisor.max(1)
    }
}

/// Parameters of the motion masker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Radius of the disc painted around each moving feature.
    pub radius: usize,
    /// Only features whose flow magnitude is strictly above this are painted.
    pub magnitude_threshold: f32,
    /// The RGB565 color written over masked pixels.
    pub color: u16,
    /// Yield after every row divisible by this value while compositing. Zero disables it.
    pub yield_every_rows: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            radius: 15,
            magnitude_threshold: 2.0,
            color: RGB565_WHITE,
            yield_every_rows: 10,
        }
    }
}

/// Parameters of the blob search and the actuation mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Color box of the target object.
    pub target: ColorThreshold,
    /// Shape gate for the target blob.
    pub blob_filter: BlobFilter,
    /// Search for the target every this many frames. Zero disables the search.
    pub blob_every_frames: u64,
    /// Motion compensation only runs at or above this confidence.
    pub min_confidence: f32,
    /// Degrees of compensation per pixel of motion.
    pub motion_gain: f32,
    /// Draw the blob box and the flow vectors into the frame.
    pub draw_overlay: bool,
    /// The RGB565 color of the blob box.
    pub blob_color: u16,
    /// The RGB565 color of the flow vectors.
    pub flow_color: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            target: ColorThreshold::SKIN,
            blob_filter: BlobFilter::default(),
            blob_every_frames: 3,
            min_confidence: 0.3,
            motion_gain: 0.5,
            draw_overlay: true,
            blob_color: RGB565_GREEN,
            flow_color: RGB565_GREEN,
        }
    }
}

/// The configuration of a whole [`crate::pipeline::VisionPipeline`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The optical flow tracker.
    pub tracker: TrackerConfig,
    /// The color segmenter.
    pub segmenter: SegmenterConfig,
    /// The motion masker.
    pub mask: MaskConfig,
    /// Blob search and actuation.
    pub control: ControlConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::info!("loading configuration from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), TrackerError> {
        self.tracker.validate()?;
        if !self.control.target.is_valid() {
            return Err(TrackerError::InvalidConfig(format!(
                "target threshold has inverted bounds: {:?}",
                self.control.target
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.tracker.capacity, 20);
        assert_eq!(config.tracker.reseed_below(), 6);
        assert_eq!(config.tracker.corner.grid_stride, 8);
        assert_eq!(config.segmenter.min_pixel_count, 100);
        assert_eq!(config.mask.radius, 15);
        assert_eq!(config.control.target, ColorThreshold::SKIN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document() -> Result<(), TrackerError> {
        let config = PipelineConfig::from_json_str(
            r#"{
                "tracker": { "reseed_divisor": 2, "corner": { "k": 0.06 } },
                "mask": { "radius": 8 },
                "control": { "target": { "r_min": 150 } }
            }"#,
        )?;
        assert_eq!(config.tracker.reseed_below(), 10);
        assert_eq!(config.tracker.corner.k, 0.06);
        assert_eq!(config.tracker.corner.grid_margin, 10);
        assert_eq!(config.mask.radius, 8);
        assert_eq!(config.mask.magnitude_threshold, 2.0);
        assert_eq!(config.control.target.r_min, 150);
        Ok(())
    }

    #[test]
    fn invalid_values() {
        for doc in [
            r#"{ "tracker": { "capacity": 0 } }"#,
            r#"{ "tracker": { "window_size": 4 } }"#,
            r#"{ "tracker": { "window_size": 1 } }"#,
            r#"{ "tracker": { "reseed_divisor": 0 } }"#,
            r#"{ "tracker": { "corner": { "grid_stride": 0 } } }"#,
            r#"{ "control": { "target": { "g_min": 200, "g_max": 100 } } }"#,
        ] {
            assert!(
                matches!(
                    PipelineConfig::from_json_str(doc),
                    Err(TrackerError::InvalidConfig(_))
                ),
                "{doc}"
            );
        }
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            PipelineConfig::from_json_str("{ tracker"),
            Err(TrackerError::ConfigParse(_))
        ));
    }

    #[test]
    fn from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "control": {{ "blob_every_frames": 5 }} }}"#)?;
        let config = PipelineConfig::from_json_file(file.path())?;
        assert_eq!(config.control.blob_every_frames, 5);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            PipelineConfig::from_json_file(missing),
            Err(TrackerError::ConfigIo(_))
        ));
        Ok(())
    }
}
