//! Exact Euclidean distance transforms for 2D and 3D grids
//!
//! This crate computes, for every voxel of a binary volume, the Euclidean
//! distance to the nearest voxel of the other class. It implements the
//! Felzenszwalb & Huttenlocher separable transform: the squared distance is
//! the lower envelope of parabolas along each axis in turn, so a volume of
//! N voxels is transformed in O(N) per axis.
//!
//! # Modules
//!
//! - [`envelope`]: the 1D lower-envelope kernel (unsigned and signed)
//! - [`sweep`]: per-axis passes over the working buffer
//! - [`transform`]: classification, buffer management and pass ordering
//! - [`classify`], [`calibration`], [`options`]: how samples become seeds
//!   and how distances are scaled
//! - [`progress`]: progress callbacks and cooperative cancellation
//!
//! # Variants
//!
//! The unsigned transform (EDT) yields `d >= 0`, zero on the seed voxels.
//! The signed transform (SEDT) yields `-0.5 - d` inside the foreground and
//! `0.5 + d` outside it, where `d` is the distance to the nearest voxel of
//! the other class.

pub mod calibration;
pub mod classify;
pub mod envelope;
pub mod error;
pub mod extents;
pub mod options;
pub mod progress;
pub mod source;
pub mod stats;
pub mod sweep;
pub mod transform;

pub use calibration::Calibration;
pub use classify::{Classifier, Polarity};
pub use envelope::{Envelope, SignedEnvelope};
pub use error::{DistanceTransformError, Result};
pub use extents::{Extents, SweepAxis};
pub use options::{Execution, TransformOptions};
pub use progress::{CancelToken, ProgressSink};
pub use source::{FnSource, VoxelSource};
pub use stats::DistanceStats;
pub use transform::{compute_distance_transform, edt, edt_2d, sedt, sedt_2d, DistanceTransform};
