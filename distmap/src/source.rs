//! Read access to source volumes
//!
//! The transform only needs the extents of a volume and a way to read each
//! voxel as a scalar. [`VoxelSource`] captures that, so callers can feed
//! `ndarray` views, decoded image stacks or procedural volumes alike.

use ndarray::{ArrayBase, Data, Ix2, Ix3};
use num_traits::ToPrimitive;

use crate::extents::Extents;

/// A read-only scalar volume addressed by `(x, y, z)`
pub trait VoxelSource {
    /// Dimensions of the volume
    fn extents(&self) -> Extents;

    /// Sample at `(x, y, z)` as `f64`
    ///
    /// Callers only pass coordinates inside [`VoxelSource::extents`].
    fn sample(&self, x: usize, y: usize, z: usize) -> f64;
}

impl<S, T> VoxelSource for ArrayBase<S, Ix3>
where
    S: Data<Elem = T>,
    T: ToPrimitive,
{
    fn extents(&self) -> Extents {
        Extents::from_shape(self.shape())
    }

    fn sample(&self, x: usize, y: usize, z: usize) -> f64 {
        self[[z, y, x]].to_f64().unwrap_or(f64::NAN)
    }
}

impl<S, T> VoxelSource for ArrayBase<S, Ix2>
where
    S: Data<Elem = T>,
    T: ToPrimitive,
{
    fn extents(&self) -> Extents {
        Extents::from_shape(self.shape())
    }

    fn sample(&self, x: usize, y: usize, _z: usize) -> f64 {
        self[[y, x]].to_f64().unwrap_or(f64::NAN)
    }
}

impl<V: VoxelSource + ?Sized> VoxelSource for &V {
    fn extents(&self) -> Extents {
        (**self).extents()
    }

    fn sample(&self, x: usize, y: usize, z: usize) -> f64 {
        (**self).sample(x, y, z)
    }
}

/// A procedural volume defined by a closure over `(x, y, z)`
pub struct FnSource<F> {
    extents: Extents,
    func: F,
}

impl<F> FnSource<F>
where
    F: Fn(usize, usize, usize) -> f64,
{
    pub fn new(extents: Extents, func: F) -> Self {
        Self { extents, func }
    }
}

impl<F> VoxelSource for FnSource<F>
where
    F: Fn(usize, usize, usize) -> f64,
{
    fn extents(&self) -> Extents {
        self.extents
    }

    fn sample(&self, x: usize, y: usize, z: usize) -> f64 {
        (self.func)(x, y, z)
    }
}
