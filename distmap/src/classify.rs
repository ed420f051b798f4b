//! Binary inside/outside classification of source volumes
//!
//! Every transform starts by reducing the source volume to a mask: `true`
//! for foreground ("inside") voxels, `false` for background. The polarity
//! then decides which of the two classes acts as the distance-zero seed set.

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::source::VoxelSource;

/// Which class of voxels receives distance zero in the unsigned transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Background voxels are seeds; foreground voxels get their distance to
    /// the nearest background voxel.
    #[default]
    BackgroundSeeds,
    /// Foreground voxels are seeds; background voxels get their distance to
    /// the nearest foreground voxel.
    ForegroundSeeds,
}

impl Polarity {
    /// True if a voxel of the given class is a distance-zero seed
    pub fn is_seed(self, foreground: bool) -> bool {
        match self {
            Polarity::BackgroundSeeds => !foreground,
            Polarity::ForegroundSeeds => foreground,
        }
    }
}

/// Threshold classifier: a voxel is foreground when its sample is strictly
/// greater than `threshold`
///
/// With the default threshold of 0, any non-zero sample is foreground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub threshold: f64,
}

impl Classifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_foreground(&self, sample: f64) -> bool {
        sample > self.threshold
    }

    /// Classify every voxel of `source` into a `[z, y, x]` mask
    pub fn classify<V: VoxelSource + ?Sized>(&self, source: &V) -> Array3<bool> {
        let extents = source.extents();
        Array3::from_shape_fn(extents.dim(), |(z, y, x)| {
            self.is_foreground(source.sample(x, y, z))
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Count foreground voxels in a mask
pub fn count_foreground(mask: ArrayView3<bool>) -> usize {
    mask.iter().filter(|&&inside| inside).count()
}
