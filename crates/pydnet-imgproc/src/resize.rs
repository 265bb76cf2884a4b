use pydnet_image::{Image, ImageError};
use rayon::prelude::*;

use crate::interpolation::bilinear_interpolation;

/// Resize an image to the size of `dst` using bilinear interpolation.
///
/// Pixel centers are aligned the same way OpenCV's `INTER_LINEAR` does, so the
/// output matches predictions that were stored after an OpenCV resize.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, its size selects the new resolution.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if either image has no pixels.
///
/// # Example
///
/// ```
/// use pydnet_image::{Image, ImageSize};
/// use pydnet_imgproc::resize::resize_bilinear;
///
/// let image = Image::<f32>::from_size_val([4, 5].into(), 2.0).unwrap();
///
/// let mut image_resized = Image::<f32>::from_size_val([2, 3].into(), 0.0).unwrap();
///
/// resize_bilinear(&image, &mut image_resized).unwrap();
///
/// assert_eq!(image_resized.width(), 2);
/// assert_eq!(image_resized.height(), 3);
/// assert!(image_resized.as_slice().iter().all(|&v| v == 2.0));
/// ```
pub fn resize_bilinear(src: &Image<f32>, dst: &mut Image<f32>) -> Result<(), ImageError> {
    if src.numel() == 0 || dst.numel() == 0 {
        return Err(ImageError::EmptyImage);
    }

    let dst_cols = dst.cols();
    let scale_x = src.cols() as f32 / dst_cols as f32;
    let scale_y = src.rows() as f32 / dst.rows() as f32;

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols)
        .enumerate()
        .for_each(|(row, dst_row)| {
            let v = (row as f32 + 0.5) * scale_y - 0.5;
            dst_row.iter_mut().enumerate().for_each(|(col, dst_val)| {
                let u = (col as f32 + 0.5) * scale_x - 0.5;
                *dst_val = bilinear_interpolation(src, u, v);
            });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use pydnet_image::{Image, ImageError};

    #[test]
    fn resize_identity() -> Result<(), ImageError> {
        let image = Image::<f32>::new([3, 2].into(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
        let mut resized = Image::from_size_val(image.size(), 0.0f32)?;

        super::resize_bilinear(&image, &mut resized)?;

        assert_eq!(resized.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn resize_upscale() -> Result<(), ImageError> {
        let image = Image::<f32>::new([2, 1].into(), vec![0.0, 4.0])?;
        let mut resized = Image::from_size_val([4, 1].into(), 0.0f32)?;

        super::resize_bilinear(&image, &mut resized)?;

        let expected = [0.0, 1.0, 3.0, 4.0];
        for (a, b) in resized.as_slice().iter().zip(expected.iter()) {
            approx::assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn resize_empty() -> Result<(), ImageError> {
        let image = Image::<f32>::new([0, 0].into(), vec![])?;
        let mut resized = Image::from_size_val([2, 2].into(), 0.0f32)?;
        assert_eq!(
            super::resize_bilinear(&image, &mut resized),
            Err(ImageError::EmptyImage)
        );
        Ok(())
    }
}
