//! Error type for the distance transform engine

use thiserror::Error;

/// Errors that can occur while setting up or running a distance transform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistanceTransformError {
    /// Buffer or flat data does not match the extents of the source volume
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Voxel spacing or other options are unusable
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The run was cancelled between rows
    #[error("Distance transform cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DistanceTransformError>;
