//! Summary statistics of distance fields

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Range and mean of the finite samples of a distance field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of finite samples
    pub finite: usize,
    /// Number of infinite or NaN samples
    pub non_finite: usize,
}

impl DistanceStats {
    /// Gather statistics over any distance array
    ///
    /// Returns `None` when the field has no finite sample.
    pub fn from_field<S, D>(field: &ArrayBase<S, D>) -> Option<Self>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut finite = 0;
        let mut non_finite = 0;

        for &value in field.iter() {
            if value.is_finite() {
                let value = value as f64;
                min = min.min(value);
                max = max.max(value);
                sum += value;
                finite += 1;
            } else {
                non_finite += 1;
            }
        }

        if finite == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: sum / finite as f64,
            finite,
            non_finite,
        })
    }

    /// Map a distance to `[0, 1]` over the observed range
    ///
    /// A constant field maps to 0; +∞ and NaN map to 1, -∞ to 0.
    pub fn normalize(&self, value: f32) -> f64 {
        if !value.is_finite() {
            return if value == f32::NEG_INFINITY { 0.0 } else { 1.0 };
        }
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value as f64 - self.min) / span).clamp(0.0, 1.0)
    }
}

impl fmt::Display for DistanceStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "min {:.3}, max {:.3}, mean {:.3} over {} finite samples",
            self.min, self.max, self.mean, self.finite
        )?;
        if self.non_finite > 0 {
            write!(f, " ({} non-finite)", self.non_finite)?;
        }
        Ok(())
    }
}
