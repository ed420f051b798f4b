//! Loading grayscale image slices as a volume

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use distmap::Extents;
use image::DynamicImage;
use log::debug;
use ndarray::{Array2, Array3, Axis};

/// Convert one decoded image to a `[y, x]` array of sample values
///
/// 16-bit grayscale keeps its full range; every other format is reduced to
/// 8-bit luma.
pub fn image_to_array(image: &DynamicImage) -> Array2<f32> {
    match image {
        DynamicImage::ImageLuma16(buffer) => {
            let (width, height) = buffer.dimensions();
            Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
                buffer.get_pixel(x as u32, y as u32).0[0] as f32
            })
        }
        other => {
            let buffer = other.to_luma8();
            let (width, height) = buffer.dimensions();
            Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
                buffer.get_pixel(x as u32, y as u32).0[0] as f32
            })
        }
    }
}

fn load_slice(path: &Path) -> Result<Array2<f32>> {
    let image =
        image::open(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(image_to_array(&image))
}

/// Load image slices into a `[z, y, x]` volume, one slice per path
///
/// Every slice must have the dimensions of the first.
pub fn load_stack(paths: &[PathBuf]) -> Result<Array3<f32>> {
    let Some((first_path, rest)) = paths.split_first() else {
        bail!("No input images given");
    };

    let first = load_slice(first_path)?;
    let (height, width) = first.dim();
    let mut volume = Array3::zeros((paths.len(), height, width));
    volume.index_axis_mut(Axis(0), 0).assign(&first);

    for (z, path) in rest.iter().enumerate() {
        let slice = load_slice(path)?;
        if slice.dim() != (height, width) {
            bail!(
                "Slice {} is {}x{}, expected {}x{}",
                path.display(),
                slice.ncols(),
                slice.nrows(),
                width,
                height
            );
        }
        volume.index_axis_mut(Axis(0), z + 1).assign(&slice);
    }

    debug!(
        "Loaded volume {} from {} slices",
        Extents::from_shape(volume.shape()),
        paths.len()
    );
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};

    #[test]
    fn test_image_to_array_8bit() {
        let mut image = GrayImage::new(3, 2);
        image.put_pixel(2, 1, Luma([200]));

        let array = image_to_array(&DynamicImage::ImageLuma8(image));
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(array[[1, 2]], 200.0);
        assert_eq!(array[[0, 0]], 0.0);
    }

    #[test]
    fn test_image_to_array_16bit() {
        let mut image: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(2, 2);
        image.put_pixel(0, 1, Luma([40000]));

        let array = image_to_array(&DynamicImage::ImageLuma16(image));
        assert_eq!(array[[1, 0]], 40000.0);
    }

    #[test]
    fn test_load_stack() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for z in 0..3u8 {
            let mut image = GrayImage::new(4, 5);
            image.put_pixel(1, 2, Luma([z + 1]));
            let path = dir.path().join(format!("slice_{z}.png"));
            image.save(&path).unwrap();
            paths.push(path);
        }

        let volume = load_stack(&paths).unwrap();
        assert_eq!(volume.shape(), &[3, 5, 4]);
        assert_eq!(volume[[2, 2, 1]], 3.0);
        assert_eq!(volume[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_load_stack_rejects_mismatched_slices() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        GrayImage::new(4, 4).save(&a).unwrap();
        GrayImage::new(4, 3).save(&b).unwrap();

        let err = load_stack(&[a, b]).unwrap_err();
        assert!(err.to_string().contains("expected 4x4"));
    }

    #[test]
    fn test_load_stack_empty() {
        assert!(load_stack(&[]).is_err());
    }
}
