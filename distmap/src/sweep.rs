//! Per-axis sweeps over the working buffer
//!
//! A pass applies the envelope kernel to every row of the volume along one
//! axis. Rows are `ndarray` lanes, so a row along X is contiguous while rows
//! along Y and Z are strided views into the same buffer. Rows never depend
//! on each other within a pass, which lets the parallel path hand them to
//! rayon workers; a pass returns only once every row is done, so the next
//! pass always sees the complete output of the previous one.

use log::trace;
use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut1, Zip};
use rayon::prelude::*;

use crate::calibration::Calibration;
use crate::classify::Polarity;
use crate::envelope::{Envelope, SignedEnvelope};
use crate::error::{DistanceTransformError, Result};
use crate::extents::{Extents, SweepAxis};
use crate::options::Execution;
use crate::progress::{CancelToken, RowCounter};

/// Half-voxel offset applied to signed distances so that no output sample
/// is zero at the inside/outside boundary.
pub const SIGNED_BOUNDARY_OFFSET: f64 = 0.5;

/// Which distance field the sweeps build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Squared distance to the seed class selected by the polarity
    Unsigned(Polarity),
    /// `+d²` outside, `-d²` inside; foreground is inside
    Signed,
}

/// One scheduled pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub axis: SweepAxis,
    /// Seeds come from the classification mask instead of the buffer
    pub seeds_from_mask: bool,
    /// Convert squared distances to final distances while writing
    pub finish: bool,
}

/// Passes for a volume, in Z, Y, X order
///
/// Axes of extent 1 need no sweep. At least one pass is always planned so
/// the mask is seeded and the output finished even for a single voxel.
/// An empty volume gets no passes.
pub fn plan_passes(extents: &Extents) -> Vec<Pass> {
    if extents.is_empty() {
        return Vec::new();
    }

    let mut axes: Vec<SweepAxis> = SweepAxis::ORDER
        .into_iter()
        .filter(|&axis| extents.len_along(axis) > 1)
        .collect();
    if axes.is_empty() {
        axes.push(SweepAxis::X);
    }

    let last = axes.len() - 1;
    axes.into_iter()
        .enumerate()
        .map(|(i, axis)| Pass {
            axis,
            seeds_from_mask: i == 0,
            finish: i == last,
        })
        .collect()
}

/// Total number of rows visited by a list of passes
pub fn total_rows(extents: &Extents, passes: &[Pass]) -> usize {
    passes
        .iter()
        .map(|pass| extents.rows_along(pass.axis))
        .sum()
}

/// Per-worker envelope storage
enum RowScratch {
    Unsigned {
        envelope: Envelope,
        polarity: Polarity,
    },
    Signed(SignedEnvelope),
}

impl RowScratch {
    fn for_mode(mode: Mode, len: usize) -> Self {
        match mode {
            Mode::Unsigned(polarity) => RowScratch::Unsigned {
                envelope: Envelope::with_capacity(len),
                polarity,
            },
            Mode::Signed => RowScratch::Signed(SignedEnvelope::with_capacity(len)),
        }
    }
}

/// Everything a pass needs besides the buffer itself
pub(crate) struct Sweeper<'m, 'a> {
    pub mask: ArrayView3<'m, bool>,
    pub mode: Mode,
    pub calibration: Calibration,
    pub execution: Execution,
    pub counter: &'a RowCounter<'a>,
    pub cancel: Option<&'a CancelToken>,
}

impl Sweeper<'_, '_> {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Run one pass over `buffer` in place
    pub fn sweep(&self, pass: Pass, buffer: &mut Array3<f32>) -> Result<()> {
        let axis = pass.axis.array_axis();
        let len = buffer.len_of(axis);
        let spacing = self.calibration.spacing(pass.axis);

        trace!(
            "sweeping {} rows of length {len} along {}",
            buffer.len() / len.max(1),
            pass.axis
        );

        let rows = Zip::from(buffer.lanes_mut(axis)).and(self.mask.lanes(axis));
        match self.execution {
            Execution::Parallel => rows.into_par_iter().for_each_init(
                || RowScratch::for_mode(self.mode, len),
                |scratch, (row, classes)| self.process_row(scratch, pass, spacing, row, classes),
            ),
            Execution::Sequential => {
                let mut scratch = RowScratch::for_mode(self.mode, len);
                rows.for_each(|row, classes| {
                    self.process_row(&mut scratch, pass, spacing, row, classes)
                });
            }
        }

        if self.is_cancelled() {
            return Err(DistanceTransformError::Cancelled);
        }
        Ok(())
    }

    fn process_row(
        &self,
        scratch: &mut RowScratch,
        pass: Pass,
        spacing: f64,
        mut row: ArrayViewMut1<f32>,
        classes: ArrayView1<bool>,
    ) {
        if self.is_cancelled() {
            return;
        }

        match scratch {
            RowScratch::Unsigned { envelope, polarity } => {
                let polarity = *polarity;
                if pass.seeds_from_mask {
                    envelope.build(
                        classes
                            .iter()
                            .map(|&fg| if polarity.is_seed(fg) { 0.0 } else { f64::INFINITY }),
                        spacing,
                    );
                } else {
                    envelope.build(row.iter().map(|&v| v as f64), spacing);
                }

                for (out, g) in row.iter_mut().zip(envelope.samples()) {
                    let value = if pass.finish { g.sqrt() } else { g };
                    *out = value as f32;
                }
            }
            RowScratch::Signed(envelope) => {
                if pass.seeds_from_mask {
                    envelope.build(
                        classes.iter().map(|&inside| {
                            if inside {
                                f64::NEG_INFINITY
                            } else {
                                f64::INFINITY
                            }
                        }),
                        spacing,
                    );
                } else {
                    envelope.build(row.iter().map(|&v| v as f64), spacing);
                }

                let values = envelope.samples(classes.iter().copied());
                for ((out, g), &inside) in row.iter_mut().zip(values).zip(classes.iter()) {
                    let value = if pass.finish {
                        finish_signed(g, inside)
                    } else {
                        g
                    };
                    *out = value as f32;
                }
            }
        }

        self.counter.tick();
    }
}

/// Final signed distance from a signed squared distance
///
/// The branch is chosen by the voxel's class, not by the sign of `g`.
pub fn finish_signed(g: f64, inside: bool) -> f64 {
    if inside {
        -SIGNED_BOUNDARY_OFFSET - (-g).sqrt()
    } else {
        SIGNED_BOUNDARY_OFFSET + g.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_plan_3d() {
        let passes = plan_passes(&Extents::new(4, 3, 2));
        let axes: Vec<SweepAxis> = passes.iter().map(|p| p.axis).collect();
        assert_eq!(axes, vec![SweepAxis::Z, SweepAxis::Y, SweepAxis::X]);
        assert!(passes[0].seeds_from_mask && !passes[0].finish);
        assert!(!passes[1].seeds_from_mask && !passes[1].finish);
        assert!(!passes[2].seeds_from_mask && passes[2].finish);
        assert_eq!(total_rows(&Extents::new(4, 3, 2), &passes), 12 + 8 + 6);
    }

    #[test]
    fn test_plan_2d_skips_depth() {
        let passes = plan_passes(&Extents::planar(5, 4));
        let axes: Vec<SweepAxis> = passes.iter().map(|p| p.axis).collect();
        assert_eq!(axes, vec![SweepAxis::Y, SweepAxis::X]);
    }

    #[test]
    fn test_plan_single_column() {
        let passes = plan_passes(&Extents::new(1, 5, 1));
        assert_eq!(
            passes,
            vec![Pass {
                axis: SweepAxis::Y,
                seeds_from_mask: true,
                finish: true
            }]
        );
    }

    #[test]
    fn test_plan_single_voxel_and_empty() {
        let passes = plan_passes(&Extents::new(1, 1, 1));
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].axis, SweepAxis::X);
        assert!(plan_passes(&Extents::new(0, 4, 4)).is_empty());
    }

    #[test]
    fn test_finish_signed_offsets() {
        assert_eq!(finish_signed(4.0, false), 2.5);
        assert_eq!(finish_signed(-4.0, true), -2.5);
        assert_eq!(finish_signed(0.0, false), 0.5);
        assert_eq!(finish_signed(0.0, true), -0.5);
    }

    #[test]
    fn test_single_sweep_along_y() {
        // [1, 0, 0, 0, 1] down a column, foreground voxels are the seeds
        let mut mask = Array3::from_elem((1, 5, 1), false);
        mask[[0, 0, 0]] = true;
        mask[[0, 4, 0]] = true;

        let sink = |_: usize, _: usize| {};
        let counter = RowCounter::new(&sink, 1);
        let sweeper = Sweeper {
            mask: mask.view(),
            mode: Mode::Unsigned(Polarity::ForegroundSeeds),
            calibration: Calibration::default(),
            execution: Execution::Sequential,
            counter: &counter,
            cancel: None,
        };

        let mut buffer = Array3::zeros((1, 5, 1));
        let pass = Pass {
            axis: SweepAxis::Y,
            seeds_from_mask: true,
            finish: false,
        };
        sweeper.sweep(pass, &mut buffer).unwrap();

        assert_eq!(buffer.iter().copied().collect::<Vec<f32>>(), vec![0.0, 1.0, 4.0, 1.0, 0.0]);
        assert_eq!(counter.completed(), 1);
    }
}
