use num_traits::Float;
use pydnet_image::{Image, ImageError};
use rayon::prelude::*;

/// Find the minimum and maximum finite values in an image.
///
/// Non-finite pixels (NaN, infinities) are ignored.
///
/// # Arguments
///
/// * `image` - The input image.
///
/// # Returns
///
/// A tuple containing the minimum and maximum values in the image.
///
/// # Errors
///
/// If the image has no finite pixel, [`ImageError::EmptyImage`] is returned.
///
/// # Example
///
/// ```
/// use pydnet_image::Image;
/// use pydnet_imgproc::normalize::find_min_max;
///
/// let image = Image::<f32>::new([2, 2].into(), vec![0.5, f32::NAN, 3.0, 1.0]).unwrap();
///
/// let (min, max) = find_min_max(&image).unwrap();
/// assert_eq!(min, 0.5);
/// assert_eq!(max, 3.0);
/// ```
pub fn find_min_max<T>(image: &Image<T>) -> Result<(T, T), ImageError>
where
    T: Float,
{
    image
        .as_slice()
        .iter()
        .filter(|x| x.is_finite())
        .fold(None, |acc: Option<(T, T)>, &x| match acc {
            None => Some((x, x)),
            Some((min, max)) => Some((min.min(x), max.max(x))),
        })
        .ok_or(ImageError::EmptyImage)
}

/// Normalize an image using its minimum and maximum values.
///
/// The formula for normalizing an image is:
///
/// (image - min_val) * (max - min) / (max_val - min_val) + min
///
/// An image with a single distinct value is mapped to `min`.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, same size as `src`.
/// * `min` - The lower end of the output range.
/// * `max` - The upper end of the output range.
pub fn normalize_min_max<T>(
    src: &Image<T>,
    dst: &mut Image<T>,
    min: T,
    max: T,
) -> Result<(), ImageError>
where
    T: Float + Send + Sync,
{
    src.ensure_same_size(dst)?;

    let (min_val, max_val) = find_min_max(src)?;
    let range = max_val - min_val;

    let cols = src.cols().max(1);
    src.as_slice()
        .par_chunks(cols)
        .zip(dst.as_slice_mut().par_chunks_mut(cols))
        .for_each(|(src_row, dst_row)| {
            src_row
                .iter()
                .zip(dst_row.iter_mut())
                .for_each(|(&src_val, dst_val)| {
                    *dst_val = if range > T::zero() {
                        (src_val - min_val) * (max - min) / range + min
                    } else {
                        min
                    };
                });
        });

    Ok(())
}
