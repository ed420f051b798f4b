//! Writing distance fields to disk

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use distmap::DistanceStats;
use image::{ImageBuffer, Luma};
use log::info;
use ndarray::{Array3, ArrayView2, Axis};

/// 16-bit grayscale image
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Render a `[y, x]` distance slice, mapping the range of `stats` onto the
/// full 16-bit scale
///
/// Infinite distances render white.
pub fn slice_to_gray16(slice: ArrayView2<f32>, stats: &DistanceStats) -> Gray16Image {
    let (height, width) = slice.dim();
    let mut img = Gray16Image::new(width as u32, height as u32);

    for ((y, x), &value) in slice.indexed_iter() {
        let level = (stats.normalize(value) * u16::MAX as f64).round() as u16;
        img.put_pixel(x as u32, y as u32, Luma([level]));
    }

    img
}

/// Write every Z slice of `field` as `<stem>_<z>.png` into `dir`
pub fn write_png_slices(
    field: &Array3<f32>,
    stats: &DistanceStats,
    dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let digits = field.len_of(Axis(0)).to_string().len();
    let mut written = Vec::new();
    for (z, slice) in field.axis_iter(Axis(0)).enumerate() {
        let path = dir.join(format!("{stem}_{z:0digits$}.png"));
        slice_to_gray16(slice, stats)
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!("Wrote {} slices to {}", written.len(), dir.display());
    Ok(written)
}

/// Write `field` as raw little-endian `f32` samples in `[z, y, x]` order
pub fn write_raw(field: &Array3<f32>, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for value in field.iter() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;

    info!(
        "Wrote {} samples ({} bytes) to {}",
        field.len(),
        field.len() * std::mem::size_of::<f32>(),
        path.display()
    );
    Ok(())
}
