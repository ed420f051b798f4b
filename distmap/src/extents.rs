//! Volume dimensions and axis bookkeeping

use ndarray::{Array3, Dim, Ix3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DistanceTransformError, Result};

/// Volume dimensions in voxels
///
/// Arrays built from an `Extents` use the row-major `[z, y, x]` convention:
/// depth comes first and x is the fastest-varying index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extents {
    /// Number of voxels along x
    pub width: usize,
    /// Number of voxels along y
    pub height: usize,
    /// Number of voxels along z (1 for a 2D image)
    pub depth: usize,
}

impl Extents {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Extents of a single 2D plane
    pub fn planar(width: usize, height: usize) -> Self {
        Self::new(width, height, 1)
    }

    /// Read extents from an array shape in `[z, y, x]` order
    pub fn from_shape(shape: &[usize]) -> Self {
        match *shape {
            [depth, height, width] => Self::new(width, height, depth),
            [height, width] => Self::planar(width, height),
            [width] => Self::new(width, 1, 1),
            _ => Self::new(0, 0, 0),
        }
    }

    /// Array shape `(depth, height, width)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.depth, self.height, self.width)
    }

    /// Array dimension for `[z, y, x]` indexing
    pub fn dim(&self) -> Ix3 {
        Dim([self.depth, self.height, self.width])
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// True if any extent is zero
    pub fn is_empty(&self) -> bool {
        self.voxel_count() == 0
    }

    /// Extent along the given sweep axis
    pub fn len_along(&self, axis: SweepAxis) -> usize {
        match axis {
            SweepAxis::X => self.width,
            SweepAxis::Y => self.height,
            SweepAxis::Z => self.depth,
        }
    }

    /// Number of rows a sweep along `axis` visits
    pub fn rows_along(&self, axis: SweepAxis) -> usize {
        match self.len_along(axis) {
            0 => 0,
            n => self.voxel_count() / n,
        }
    }

    /// Wrap row-major flat data (x fastest, then y, then z) as a volume
    pub fn volume_from_vec<T>(&self, data: Vec<T>) -> Result<Array3<T>> {
        if data.len() != self.voxel_count() {
            return Err(DistanceTransformError::InvalidDimensions(format!(
                "{} samples do not fill a {self} volume",
                data.len()
            )));
        }
        Array3::from_shape_vec(self.dim(), data)
            .map_err(|e| DistanceTransformError::InvalidDimensions(e.to_string()))
    }

    /// Fail unless `other` matches these extents exactly
    pub fn ensure_matches(&self, other: &Extents) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(DistanceTransformError::InvalidDimensions(format!(
                "expected {self}, got {other}"
            )))
        }
    }
}

impl From<(usize, usize, usize)> for Extents {
    /// Build from `(width, height, depth)`
    fn from(dimensions: (usize, usize, usize)) -> Self {
        Self::new(dimensions.0, dimensions.1, dimensions.2)
    }
}

impl fmt::Display for Extents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// One coordinate axis of a volume, as swept by a transform pass
///
/// The discriminant is the matching `ndarray` axis index for `[z, y, x]`
/// arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepAxis {
    Z = 0,
    Y = 1,
    X = 2,
}

impl SweepAxis {
    /// Pass order: Z first, X last
    pub const ORDER: [SweepAxis; 3] = [SweepAxis::Z, SweepAxis::Y, SweepAxis::X];

    pub fn array_axis(self) -> ndarray::Axis {
        ndarray::Axis(self as usize)
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SweepAxis::X => "x",
            SweepAxis::Y => "y",
            SweepAxis::Z => "z",
        };
        f.write_str(name)
    }
}
