//! Transform configuration
//!
//! [`TransformOptions`] is plain serializable data so tools can keep it in a
//! JSON file next to their inputs. Every field has a default, and partial
//! documents fill the missing fields from [`TransformOptions::default`].

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::classify::{Classifier, Polarity};
use crate::error::Result;

/// How rows of a pass are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// Rows are spread over the rayon thread pool
    #[default]
    Parallel,
    /// Rows are processed in order on the calling thread
    Sequential,
}

/// Options for one distance transform run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Produce a signed field: negative inside, positive outside
    pub signed: bool,
    /// Foreground test applied to every source sample
    pub classifier: Classifier,
    /// Seed class of the unsigned transform; the signed transform always
    /// treats foreground as inside
    pub polarity: Polarity,
    /// Physical voxel spacing
    pub calibration: Calibration,
    pub execution: Execution,
}

impl TransformOptions {
    pub fn unsigned() -> Self {
        Self::default()
    }

    pub fn signed() -> Self {
        Self {
            signed: true,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.classifier = Classifier::new(threshold);
        self
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            signed: false,
            classifier: Classifier::default(),
            polarity: Polarity::default(),
            calibration: Calibration::default(),
            execution: Execution::default(),
        }
    }
}
