use serde::{Deserialize, Serialize};
use vistrack_image::ImageError;
use vistrack_imgproc::features::Corner;

/// A tracked point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    /// Column, with sub-pixel precision.
    pub x: f32,
    /// Row, with sub-pixel precision.
    pub y: f32,
    /// Whether the point is still being tracked.
    pub valid: bool,
    /// Corner response when the point was seeded.
    pub response: f32,
}

impl From<Corner> for FeaturePoint {
    fn from(corner: Corner) -> Self {
        Self {
            x: corner.x as f32,
            y: corner.y as f32,
            valid: true,
            response: corner.response,
        }
    }
}

impl FeaturePoint {
    /// The position rounded to the nearest pixel.
    pub fn rounded(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// The displacement of a feature between two frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowVector {
    /// Horizontal displacement.
    pub dx: f32,
    /// Vertical displacement.
    pub dy: f32,
    /// Whether the solve succeeded.
    pub tracked: bool,
    /// Magnitude of the displacement.
    pub error: f32,
}

impl FlowVector {
    /// A flow for a feature that could not be tracked.
    pub const UNTRACKED: Self = Self {
        dx: 0.0,
        dy: 0.0,
        tracked: false,
        error: 0.0,
    };

    /// A tracked flow with its magnitude filled in.
    pub fn tracked(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            tracked: true,
            error: (dx * dx + dy * dy).sqrt(),
        }
    }
}

/// A bounded table of features and their flows.
///
/// `flows()[i]` always describes `features()[i]`. Both vectors are allocated
/// once at construction and never grow past the capacity.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    features: Vec<FeaturePoint>,
    flows: Vec<FlowVector>,
    capacity: usize,
}

impl FeatureTable {
    /// Allocate an empty table holding at most `capacity` features.
    pub fn new(capacity: usize) -> Result<Self, ImageError> {
        let mut features = Vec::new();
        features
            .try_reserve_exact(capacity)
            .map_err(|_| ImageError::OutOfMemory(capacity))?;
        let mut flows = Vec::new();
        flows
            .try_reserve_exact(capacity)
            .map_err(|_| ImageError::OutOfMemory(capacity))?;
        Ok(Self {
            features,
            flows,
            capacity,
        })
    }

    /// The maximum number of features.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of features in the table, valid or not.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the table holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The features.
    pub fn features(&self) -> &[FeaturePoint] {
        &self.features
    }

    /// The flows, index-aligned with [`Self::features`].
    pub fn flows(&self) -> &[FlowVector] {
        &self.flows
    }

    /// Iterate over feature and flow pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&FeaturePoint, &FlowVector)> {
        self.features.iter().zip(self.flows.iter())
    }

    /// The number of valid features.
    pub fn valid_count(&self) -> usize {
        self.features.iter().filter(|f| f.valid).count()
    }

    /// Replace the whole table with `corners`, truncated to the capacity. Flows are reset.
    pub fn reseed(&mut self, corners: &[Corner]) {
        self.clear();
        let n = corners.len().min(self.capacity);
        self.features
            .extend(corners[..n].iter().map(|&c| FeaturePoint::from(c)));
        self.flows.resize(n, FlowVector::UNTRACKED);
    }

    /// Remove the features at `indices` together with their flows.
    ///
    /// Out-of-range and repeated indices are ignored.
    pub fn remove(&mut self, indices: &[usize]) {
        let mut indices = indices
            .iter()
            .copied()
            .filter(|&i| i < self.features.len())
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices.dedup();
        for &i in indices.iter().rev() {
            self.features.remove(i);
            self.flows.remove(i);
        }
    }

    /// Remove every feature.
    pub fn clear(&mut self) {
        self.features.clear();
        self.flows.clear();
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = (&mut FeaturePoint, &mut FlowVector)> {
        self.features.iter_mut().zip(self.flows.iter_mut())
    }
}
