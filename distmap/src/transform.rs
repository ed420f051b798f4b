//! Distance transform orchestration
//!
//! Classifies the source, allocates the working buffer and runs the axis
//! passes in Z, Y, X order. The first pass seeds itself from the mask and the
//! last pass writes final distances, so the buffer handed back to the caller
//! is the result itself.
//!
//! # Usage
//!
//! ```rust
//! use distmap::{edt_2d, sedt_2d};
//! use ndarray::Array2;
//!
//! let mut image = Array2::<u8>::zeros((5, 5));
//! image[[2, 2]] = 255;
//!
//! // Distance of every foreground pixel to the nearest background pixel
//! let distances = edt_2d(&image).unwrap();
//! assert_eq!(distances[[2, 2]], 1.0);
//! assert_eq!(distances[[0, 0]], 0.0);
//!
//! // Negative inside, positive outside, offset by half a pixel
//! let signed = sedt_2d(&image).unwrap();
//! assert_eq!(signed[[2, 2]], -1.5);
//! assert_eq!(signed[[2, 3]], 1.5);
//! ```

use std::time::Instant;

use log::{debug, warn};
use ndarray::{Array2, Array3, ArrayBase, ArrayView3, Axis, Data, Ix2};
use num_traits::ToPrimitive;

use crate::classify::{count_foreground, Polarity};
use crate::error::Result;
use crate::extents::Extents;
use crate::options::TransformOptions;
use crate::progress::{CancelToken, ProgressSink, RowCounter};
use crate::source::VoxelSource;
use crate::sweep::{plan_passes, total_rows, Mode, Sweeper};

/// Configured distance transform
///
/// Holds the options plus the optional progress sink and cancellation token
/// of a run. A `DistanceTransform` keeps no state between runs, so one value
/// can be reused for any number of volumes.
#[derive(Clone, Default)]
pub struct DistanceTransform<'a> {
    options: TransformOptions,
    progress: Option<&'a dyn ProgressSink>,
    cancel: Option<CancelToken>,
}

impl<'a> DistanceTransform<'a> {
    pub fn new(options: TransformOptions) -> Self {
        Self {
            options,
            progress: None,
            cancel: None,
        }
    }

    /// Report `(completed_rows, total_rows)` to `sink` after every row
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Stop between rows once `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn mode(&self) -> Mode {
        if self.options.signed {
            Mode::Signed
        } else {
            Mode::Unsigned(self.options.polarity)
        }
    }

    /// Classify `source` and transform it into a new volume
    pub fn compute<V: VoxelSource + ?Sized>(&self, source: &V) -> Result<Array3<f32>> {
        self.options.validate()?;
        let mask = self.options.classifier.classify(source);
        self.compute_mask(mask.view())
    }

    /// Transform a 2D image, returning a `[y, x]` array
    pub fn compute_2d<S, T>(&self, image: &ArrayBase<S, Ix2>) -> Result<Array2<f32>>
    where
        S: Data<Elem = T>,
        T: ToPrimitive,
    {
        Ok(self.compute(image)?.index_axis_move(Axis(0), 0))
    }

    /// Transform an already classified mask (`true` = foreground)
    pub fn compute_mask(&self, mask: ArrayView3<bool>) -> Result<Array3<f32>> {
        let mut output = Array3::zeros(mask.raw_dim());
        self.compute_into(mask, &mut output)?;
        Ok(output)
    }

    /// Transform `mask` using `output` as the working buffer
    ///
    /// `output` must have the same extents as `mask`; its previous contents
    /// are ignored and fully overwritten.
    /// After a cancelled run its contents are unspecified.
    pub fn compute_into(&self, mask: ArrayView3<bool>, output: &mut Array3<f32>) -> Result<()> {
        self.options.validate()?;

        let extents = Extents::from_shape(mask.shape());
        extents.ensure_matches(&Extents::from_shape(output.shape()))?;

        if extents.is_empty() {
            debug!("Skipping distance transform of empty volume {extents}");
            return Ok(());
        }

        self.warn_if_seedless(&mask, &extents);

        let passes = plan_passes(&extents);
        let silent = |_: usize, _: usize| {};
        let sink: &dyn ProgressSink = match self.progress {
            Some(sink) => sink,
            None => &silent,
        };
        let counter = RowCounter::new(sink, total_rows(&extents, &passes));

        let sweeper = Sweeper {
            mask,
            mode: self.mode(),
            calibration: self.options.calibration,
            execution: self.options.execution,
            counter: &counter,
            cancel: self.cancel.as_ref(),
        };

        let started = Instant::now();
        for pass in passes {
            let pass_started = Instant::now();
            sweeper.sweep(pass, output)?;
            debug!(
                "{} pass along {} took {:?}",
                if self.options.signed { "SEDT" } else { "EDT" },
                pass.axis,
                pass_started.elapsed()
            );
        }
        debug!(
            "Distance transform of {extents} finished in {:?} ({}/{} rows)",
            started.elapsed(),
            counter.completed(),
            counter.total()
        );

        Ok(())
    }

    fn warn_if_seedless(&self, mask: &ArrayView3<bool>, extents: &Extents) {
        let foreground = count_foreground(mask.view());
        let background = extents.voxel_count() - foreground;

        if self.options.signed {
            if foreground == 0 || background == 0 {
                warn!(
                    "Signed distance transform of {extents} has only one class \
                     ({foreground} foreground voxels); distances will be infinite"
                );
            }
        } else {
            let seeds = match self.options.polarity {
                Polarity::BackgroundSeeds => background,
                Polarity::ForegroundSeeds => foreground,
            };
            if seeds == 0 {
                warn!("Distance transform of {extents} has no seed voxels; distances will be infinite");
            }
        }
    }
}

/// Transform `source` with default options, unsigned or signed
pub fn compute_distance_transform<V: VoxelSource + ?Sized>(
    source: &V,
    signed: bool,
) -> Result<Array3<f32>> {
    let options = if signed {
        TransformOptions::signed()
    } else {
        TransformOptions::unsigned()
    };
    DistanceTransform::new(options).compute(source)
}

/// Euclidean distance of every foreground voxel to the nearest background voxel
pub fn edt<V: VoxelSource + ?Sized>(source: &V) -> Result<Array3<f32>> {
    compute_distance_transform(source, false)
}

/// Signed Euclidean distance: negative inside the foreground, positive outside
pub fn sedt<V: VoxelSource + ?Sized>(source: &V) -> Result<Array3<f32>> {
    compute_distance_transform(source, true)
}

/// [`edt`] for a 2D image
pub fn edt_2d<S, T>(image: &ArrayBase<S, Ix2>) -> Result<Array2<f32>>
where
    S: Data<Elem = T>,
    T: ToPrimitive,
{
    DistanceTransform::new(TransformOptions::unsigned()).compute_2d(image)
}

/// [`sedt`] for a 2D image
pub fn sedt_2d<S, T>(image: &ArrayBase<S, Ix2>) -> Result<Array2<f32>>
where
    S: Data<Elem = T>,
    T: ToPrimitive,
{
    DistanceTransform::new(TransformOptions::signed()).compute_2d(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::error::DistanceTransformError;
    use crate::options::Execution;
    use approx::assert_relative_eq;
    use ndarray::{arr2, Array2, Array3};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn single_point(size: usize) -> Array2<u8> {
        let mut image = Array2::from_elem((size, size), 1u8);
        image[[size / 2, size / 2]] = 0;
        image
    }

    #[test]
    fn test_row_with_two_seeds() {
        let image = arr2(&[[0u8, 1, 1, 1, 0]]);
        let result = edt_2d(&image).unwrap();
        assert_eq!(result, arr2(&[[0.0f32, 1.0, 2.0, 1.0, 0.0]]));
    }

    #[test]
    fn test_foreground_seed_column() {
        // 1x5x1 column, 1 marks the seeds
        let mut volume = Array3::<u8>::zeros((1, 5, 1));
        volume[[0, 0, 0]] = 1;
        volume[[0, 4, 0]] = 1;

        let options = TransformOptions::unsigned().with_polarity(Polarity::ForegroundSeeds);
        let result = DistanceTransform::new(options).compute(&volume).unwrap();

        let column: Vec<f32> = result.iter().copied().collect();
        assert_eq!(column, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_single_point_is_radial() {
        let size = 11;
        let result = edt_2d(&single_point(size)).unwrap();
        let c = (size / 2) as f64;

        for ((y, x), &value) in result.indexed_iter() {
            let expected = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
            assert_relative_eq!(value as f64, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_seeds_are_zero_and_output_non_negative() {
        let image = arr2(&[
            [0u8, 1, 1, 0, 1],
            [1, 1, 1, 1, 1],
            [1, 1, 0, 1, 1],
            [0, 1, 1, 1, 1],
        ]);
        let result = edt_2d(&image).unwrap();

        for (idx, &value) in result.indexed_iter() {
            assert!(value >= 0.0);
            if image[idx] == 0 {
                assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn test_signed_signs_and_offset() {
        let mut image = Array2::<u8>::zeros((7, 7));
        for y in 2..5 {
            for x in 2..5 {
                image[[y, x]] = 1;
            }
        }
        let result = sedt_2d(&image).unwrap();

        for (idx, &value) in result.indexed_iter() {
            assert!(value.abs() >= 0.5);
            if image[idx] == 1 {
                assert!(value < 0.0, "inside voxel {idx:?} should be negative");
            } else {
                assert!(value > 0.0, "outside voxel {idx:?} should be positive");
            }
        }

        assert_eq!(result[[3, 3]], -2.5);
        assert_eq!(result[[2, 2]], -1.5);
        assert_eq!(result[[1, 2]], 1.5);
        assert_eq!(result[[0, 3]], 2.5);
    }

    #[test]
    fn test_calibrated_spacing() {
        let image = arr2(&[[0u8, 1, 1, 1]]);
        let options =
            TransformOptions::unsigned().with_calibration(Calibration::new(0.25, 1.0, 1.0));
        let result = DistanceTransform::new(options).compute_2d(&image).unwrap();
        assert_eq!(result, arr2(&[[0.0f32, 0.25, 0.5, 0.75]]));
    }

    #[test]
    fn test_anisotropic_3d_point() {
        let mut volume = Array3::<u8>::ones((5, 5, 5));
        volume[[2, 2, 2]] = 0;
        let calibration = Calibration::new(1.0, 2.0, 3.0);
        let options = TransformOptions::unsigned().with_calibration(calibration);
        let result = DistanceTransform::new(options).compute(&volume).unwrap();

        for ((z, y, x), &value) in result.indexed_iter() {
            let dx = (x as f64 - 2.0) * calibration.x;
            let dy = (y as f64 - 2.0) * calibration.y;
            let dz = (z as f64 - 2.0) * calibration.z;
            let expected = (dx * dx + dy * dy + dz * dz).sqrt();
            assert_relative_eq!(value as f64, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_empty_volume_is_noop() {
        let volume = Array3::<u8>::zeros((0, 4, 4));
        let result = edt(&volume).unwrap();
        assert_eq!(result.shape(), &[0, 4, 4]);
    }

    #[test]
    fn test_mismatched_output_is_rejected() {
        let mask = Array3::from_elem((2, 3, 4), true);
        let mut output = Array3::zeros((2, 3, 5));
        let err = DistanceTransform::default()
            .compute_into(mask.view(), &mut output)
            .unwrap_err();
        assert!(matches!(err, DistanceTransformError::InvalidDimensions(_)));
    }

    #[test]
    fn test_invalid_calibration_is_rejected() {
        let options = TransformOptions::unsigned().with_calibration(Calibration::new(1.0, 1.0, 0.0));
        let err = DistanceTransform::new(options)
            .compute(&Array3::<u8>::zeros((2, 2, 2)))
            .unwrap_err();
        assert!(matches!(err, DistanceTransformError::InvalidOptions(_)));
    }

    #[test]
    fn test_no_seed_gives_infinity() {
        let image = Array2::from_elem((3, 3), 1u8);
        let result = edt_2d(&image).unwrap();
        assert!(result.iter().all(|v| *v == f32::INFINITY));
    }

    #[test]
    fn test_progress_counts_every_row() {
        let volume = Array3::<u8>::ones((2, 3, 4));
        let calls = AtomicUsize::new(0);
        let last = AtomicUsize::new(0);
        let sink = |completed: usize, total: usize| {
            calls.fetch_add(1, Ordering::SeqCst);
            last.fetch_max(completed, Ordering::SeqCst);
            assert_eq!(total, 12 + 8 + 6);
        };

        DistanceTransform::new(TransformOptions::unsigned())
            .with_progress(&sink)
            .compute(&volume)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 26);
        assert_eq!(last.load(Ordering::SeqCst), 26);
    }

    #[test]
    fn test_cancelled_run() {
        let token = CancelToken::new();
        token.cancel();
        let err = DistanceTransform::default()
            .with_cancel_token(token)
            .compute(&single_point(9))
            .unwrap_err();
        assert_eq!(err, DistanceTransformError::Cancelled);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let image = single_point(15);
        let parallel = edt_2d(&image).unwrap();
        let sequential = DistanceTransform::new(
            TransformOptions::unsigned().with_execution(Execution::Sequential),
        )
        .compute_2d(&image)
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_buffer_reuse() {
        let mask = Array3::from_shape_fn((1, 1, 5), |(_, _, x)| x != 0 && x != 4);
        let mut output = Array3::from_elem((1, 1, 5), 42.0f32);
        DistanceTransform::default()
            .compute_into(mask.view(), &mut output)
            .unwrap();
        assert_eq!(output.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_compute_into_with_progress() {
        let mask = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z + y + x) % 3 != 0);
        let mut output = Array3::zeros((3, 4, 5));
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |completed: usize, total: usize| {
            seen.lock().unwrap().push((completed, total));
        };

        DistanceTransform::new(TransformOptions::signed())
            .with_progress(&sink)
            .compute_into(mask.view(), &mut output)
            .unwrap();

        let total = 20 + 15 + 12;
        let expected: Vec<_> = (1..=total).map(|c| (c, total)).collect();
        assert_eq!(seen.into_inner().unwrap(), expected);
        assert_eq!(output, sedt(&mask.mapv(u8::from)).unwrap());
    }
}
