use nnviz_image::{Image, ImageError};

use super::{kernels, separable_filter, separable_filter_with_strategy};
use crate::{padding::PaddingMode, parallel::ExecutionStrategy};

/// Number of standard deviations covered on each side by [`gaussian_filter`].
pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

/// Largest kernel radius evaluated by [`gaussian_filter`].
///
/// Wider gaussians are flat over this range; the taps beyond it are dropped.
pub const MAX_GAUSSIAN_RADIUS: usize = 1 << 18;

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError> {
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)
}

/// Smooth an image with an isotropic gaussian of standard deviation `sigma`.
///
/// The kernel size is derived from `sigma`, truncating the gaussian at
/// [`GAUSSIAN_TRUNCATE`] standard deviations and capping the radius at
/// [`MAX_GAUSSIAN_RADIUS`]. Kernels wider than the image are folded onto the
/// border period, so the cost per pixel is bounded by the image size.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The standard deviation of the gaussian, in pixels.
/// * `border` - How pixels outside of the image are read.
/// * `strategy` - The execution strategy.
///
/// # Errors
///
/// Returns [`ImageError::InvalidSigma`] if `sigma` is not positive and finite.
///
/// # Example
///
/// ```
/// use nnviz_image::{Image, ImageSize};
/// use nnviz_imgproc::filter::gaussian_filter;
/// use nnviz_imgproc::padding::PaddingMode;
/// use nnviz_imgproc::parallel::ExecutionStrategy;
///
/// let size = ImageSize { width: 8, height: 8 };
/// let src = Image::<f32, 1>::from_size_val(size, 1.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// gaussian_filter(&src, &mut dst, 2.0, PaddingMode::Reflect, ExecutionStrategy::Serial).unwrap();
///
/// assert!(dst.as_slice().iter().all(|v| (v - 1.0).abs() < 1e-5));
/// ```
pub fn gaussian_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
    border: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(ImageError::InvalidSigma(sigma));
    }

    let radius =
        kernels::gaussian_kernel_radius(sigma, GAUSSIAN_TRUNCATE).min(MAX_GAUSSIAN_RADIUS);
    let kernel = kernels::gaussian_kernel_1d(2 * radius + 1, sigma);
    let kernel_x = kernels::fold_kernel(&kernel, src.cols(), border);
    let kernel_y = kernels::fold_kernel(&kernel, src.rows(), border);
    separable_filter_with_strategy(src, dst, &kernel_x, &kernel_y, border, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnviz_image::ImageSize;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    // mean squared difference between horizontal and vertical neighbours
    fn high_frequency_energy(img: &Image<f32, 1>) -> f32 {
        let (rows, cols) = (img.rows(), img.cols());
        let data = img.as_slice();
        let mut acc = 0.0;
        let mut n = 0;
        for r in 0..rows {
            for c in 0..cols {
                let v = data[r * cols + c];
                if c + 1 < cols {
                    acc += (data[r * cols + c + 1] - v).powi(2);
                    n += 1;
                }
                if r + 1 < rows {
                    acc += (data[(r + 1) * cols + c] - v).powi(2);
                    n += 1;
                }
            }
        }
        acc / n as f32
    }

    #[test]
    fn test_gaussian_blur_preserves_mass_in_center() -> Result<(), ImageError> {
        let size = ImageSize { width: 9, height: 9 };
        let mut img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        img.as_slice_mut()[40] = 1.0;
        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;

        gaussian_blur(&img, &mut dst, (5, 5), (1.0, 1.0))?;

        let total = dst.as_slice().iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(
            dst.as_slice()
                .iter()
                .cloned()
                .fold(f32::MIN, f32::max),
            dst.as_slice()[40]
        );

        Ok(())
    }

    #[test]
    fn test_gaussian_filter_wide_kernel_matches_folded() -> Result<(), ImageError> {
        let size = ImageSize { width: 3, height: 2 };
        let img = Image::<f32, 1>::new(size, vec![0.0, 1.0, 4.0, 2.0, 8.0, 3.0])?;
        let kernel = kernels::gaussian_kernel_1d(21, 3.0);

        for border in [
            PaddingMode::Constant,
            PaddingMode::Replicate,
            PaddingMode::Reflect,
            PaddingMode::Reflect101,
            PaddingMode::Wrap,
        ] {
            let mut expected = Image::<f32, 1>::from_size_val(size, 0.0)?;
            separable_filter_with_strategy(
                &img,
                &mut expected,
                &kernel,
                &kernel,
                border,
                ExecutionStrategy::Serial,
            )?;

            let kernel_x = kernels::fold_kernel(&kernel, size.width, border);
            let kernel_y = kernels::fold_kernel(&kernel, size.height, border);
            let mut folded = Image::<f32, 1>::from_size_val(size, 0.0)?;
            separable_filter_with_strategy(
                &img,
                &mut folded,
                &kernel_x,
                &kernel_y,
                border,
                ExecutionStrategy::Serial,
            )?;

            for (a, e) in folded.as_slice().iter().zip(expected.as_slice()) {
                assert!((a - e).abs() < 1e-5, "{border:?}: {a} != {e}");
            }
        }

        Ok(())
    }

    #[test]
    fn test_gaussian_filter_huge_sigma() -> Result<(), ImageError> {
        let size = ImageSize { width: 4, height: 4 };
        let img = Image::<f32, 1>::new(size, (0..16).map(|x| x as f32).collect())?;
        let mean = 7.5;

        for sigma in [1e5, 2e5, 1e20, f32::MAX] {
            let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
            gaussian_filter(
                &img,
                &mut dst,
                sigma,
                PaddingMode::Reflect,
                ExecutionStrategy::Serial,
            )?;

            // the blur averages the whole image
            for v in dst.as_slice() {
                assert!((v - mean).abs() < 1e-2, "sigma {sigma}: {v}");
            }
        }

        Ok(())
    }

    #[test]
    fn test_gaussian_filter_invalid_sigma() -> Result<(), ImageError> {
        let size = ImageSize { width: 2, height: 2 };
        let img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dst = img.clone();

        for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let res = gaussian_filter(
                &img,
                &mut dst,
                sigma,
                PaddingMode::Reflect,
                ExecutionStrategy::Serial,
            );
            assert!(matches!(res, Err(ImageError::InvalidSigma(_))));
        }

        Ok(())
    }

    #[test]
    fn test_gaussian_filter_smoothness_increases_with_sigma() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let data = (0..size.width * size.height)
            .map(|_| rng.random_range(0.0..1.0))
            .collect();
        let img = Image::<f32, 1>::new(size, data)?;

        let mut previous = high_frequency_energy(&img);
        for sigma in [0.5, 1.0, 2.0, 4.0, 8.0] {
            let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
            gaussian_filter(
                &img,
                &mut dst,
                sigma,
                PaddingMode::Reflect,
                ExecutionStrategy::Serial,
            )?;
            let energy = high_frequency_energy(&dst);
            assert!(energy < previous, "sigma {sigma}: {energy} >= {previous}");
            previous = energy;
        }

        Ok(())
    }
}
