//! Physical voxel spacing

use serde::{Deserialize, Serialize};

use crate::error::{DistanceTransformError, Result};
use crate::extents::SweepAxis;

/// Voxel spacing along each axis, in physical units per voxel
///
/// Distances produced by the transform are expressed in these units. The
/// default is an isotropic spacing of 1.0, i.e. distances in voxels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Calibration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn isotropic(spacing: f64) -> Self {
        Self::new(spacing, spacing, spacing)
    }

    /// Spacing along the given sweep axis
    pub fn spacing(&self, axis: SweepAxis) -> f64 {
        match axis {
            SweepAxis::X => self.x,
            SweepAxis::Y => self.y,
            SweepAxis::Z => self.z,
        }
    }

    /// Reject zero, negative or non-finite spacings
    pub fn validate(&self) -> Result<()> {
        for axis in SweepAxis::ORDER {
            let spacing = self.spacing(axis);
            if !(spacing.is_finite() && spacing > 0.0) {
                return Err(DistanceTransformError::InvalidOptions(format!(
                    "voxel spacing along {axis} must be finite and positive, got {spacing}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::isotropic(1.0)
    }
}
