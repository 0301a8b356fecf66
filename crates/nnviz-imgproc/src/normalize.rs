//! Image normalization operations.
//!
//! * **Min-Max Normalization** ([`normalize_min_max`]) - Scale to a target range,
//!   typically [0, 1] before colorizing a heatmap.

use num_traits::Float;

use nnviz_image::{Image, ImageError};

use crate::parallel;

/// Find the minimum and maximum values in an image.
///
/// NaN values are skipped.
///
/// # Arguments
///
/// * `image` - The input image of shape (height, width, channels).
///
/// # Returns
///
/// A tuple containing the minimum and maximum values in the image.
///
/// # Errors
///
/// If the image data is empty, an error is returned.
///
/// # Example
///
/// ```
/// use nnviz_image::{Image, ImageSize};
/// use nnviz_imgproc::normalize::find_min_max;
///
/// let image_data = vec![0u8, 1, 0, 1, 2, 3, 0, 1, 0, 1, 2, 3];
/// let image = Image::<u8, 3>::new(
///   ImageSize {
///     width: 2,
///     height: 2,
///   },
///   image_data,
/// )
/// .unwrap();
///
/// let (min, max) = find_min_max(&image).unwrap();
/// assert_eq!(min, 0);
/// assert_eq!(max, 3);
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImageError>
where
    T: Clone + Copy + PartialOrd,
{
    // NaN compares false against itself
    let mut values = image.as_slice().iter().filter(|x| *x == *x);

    let first_element = match values.next() {
        Some(x) => x,
        None => return Err(ImageError::ImageDataNotInitialized),
    };

    let mut min = first_element;
    let mut max = first_element;

    for x in values {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }

    Ok((*min, *max))
}

/// Normalize an image using the minimum and maximum values.
///
/// The formula for normalizing an image is:
///
/// (image - min_val) * (max - min) / (max_val - min_val) + min
///
/// where `min_val` and `max_val` are taken over all channels. When the image is
/// constant (`max_val == min_val`) every output value is set to `min`.
///
/// # Arguments
///
/// * `src` - The input image of shape (height, width, channels).
/// * `dst` - The output image of shape (height, width, channels).
/// * `min` - The lower bound of the target range.
/// * `max` - The upper bound of the target range.
///
/// # Returns
///
/// `true` when the source image was constant (degenerate range), else `false`.
///
/// # Example
///
/// ```
/// use nnviz_image::{Image, ImageSize};
/// use nnviz_imgproc::normalize::normalize_min_max;
///
/// let image_data = vec![0.0f32, 1.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 1.0, 2.0, 3.0];
/// let image = Image::<f32, 3>::new(
///   ImageSize {
///     width: 2,
///     height: 2,
///   },
///   image_data,
/// )
/// .unwrap();
///
/// let mut image_normalized = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// normalize_min_max(&image, &mut image_normalized, 0.0, 1.0).unwrap();
///
/// assert_eq!(image_normalized.num_channels(), 3);
/// assert_eq!(image_normalized.size().width, 2);
/// assert_eq!(image_normalized.size().height, 2);
/// ```
pub fn normalize_min_max<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    min: T,
    max: T,
) -> Result<bool, ImageError>
where
    T: Send + Sync + Float,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (min_val, max_val) = find_min_max(src)?;
    let range = max_val - min_val;

    if range <= T::zero() {
        dst.as_slice_mut().iter_mut().for_each(|v| *v = min);
        return Ok(true);
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        src_pixel
            .iter()
            .zip(dst_pixel.iter_mut())
            .for_each(|(&src_val, dst_val)| {
                let v = (src_val - min_val) * (max - min) / range + min;
                // rounding may leave the value a hair outside the target range
                *dst_val = v.max(min).min(max);
            });
    });

    Ok(false)
}
