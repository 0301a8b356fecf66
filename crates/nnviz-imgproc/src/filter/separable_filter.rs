use nnviz_image::{Image, ImageError};

use crate::padding::PaddingMode;
use crate::parallel::ExecutionStrategy;

/// A separable 2D filter that applies horizontal and vertical 1D convolutions sequentially.
///
/// This struct caches the kernel data and precomputed offsets for efficient filtering.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
    border: PaddingMode,
}

impl<'a> SeparableFilter<'a> {
    fn new(
        kernel_x: &'a [f32],
        kernel_y: &'a [f32],
        border: PaddingMode,
    ) -> Result<Self, ImageError> {
        for kernel in [kernel_x, kernel_y] {
            if kernel.is_empty() || kernel.len() % 2 == 0 {
                return Err(ImageError::InvalidKernelLength(kernel.len()));
            }
        }

        let offsets = |kernel: &[f32]| {
            let half = (kernel.len() / 2) as isize;
            (0..kernel.len())
                .map(|i| i as isize - half)
                .collect::<Vec<_>>()
        };

        Ok(Self {
            kernel_x,
            kernel_y,
            offsets_x: offsets(kernel_x),
            offsets_y: offsets(kernel_y),
            border,
        })
    }

    /// Performs horizontal filtering followed by vertical filtering using a temporary buffer.
    fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImageError> {
        let rows = src.rows();
        let cols = src.cols();
        let row_len = cols * C;

        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];

        // Horizontal
        strategy
            .for_each_row(&mut temp, row_len, |r, row_temp| {
                let src_row = &src_data[r * row_len..(r + 1) * row_len];
                for c in 0..cols {
                    let mut acc = [0.0f32; C];
                    for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                        if let Some(x) = self.border.map_index(c as isize + off, cols) {
                            let pixel = &src_row[x * C..(x + 1) * C];
                            for (acc_val, &v) in acc.iter_mut().zip(pixel.iter()) {
                                *acc_val += v * k;
                            }
                        }
                    }
                    row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
                }
            })
            .map_err(|e| ImageError::ExecutionError(e.to_string()))?;

        // Vertical
        let temp = temp.as_slice();
        strategy
            .for_each_row(dst.as_slice_mut(), row_len, |r, row_dst| {
                row_dst.iter_mut().for_each(|v| *v = 0.0);
                for (&k, &off) in self.kernel_y.iter().zip(self.offsets_y.iter()) {
                    if let Some(y) = self.border.map_index(r as isize + off, rows) {
                        let temp_row = &temp[y * row_len..(y + 1) * row_len];
                        for (d, &t) in row_dst.iter_mut().zip(temp_row.iter()) {
                            *d += t * k;
                        }
                    }
                }
            })
            .map_err(|e| ImageError::ExecutionError(e.to_string()))?;

        Ok(())
    }
}

/// Apply a separable filter to an image with an explicit border and execution strategy.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
/// * `border` - How pixels outside of the image are read.
/// * `strategy` - The execution strategy.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` differ in size and
/// [`ImageError::InvalidKernelLength`] for empty or even kernels.
pub fn separable_filter_with_strategy<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    border: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    SeparableFilter::new(kernel_x, kernel_y, border)?.apply(src, dst, strategy)
}

/// Apply a separable filter to an image using the default border and strategy.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    separable_filter_with_strategy(
        src,
        dst,
        kernel_x,
        kernel_y,
        PaddingMode::default(),
        ExecutionStrategy::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnviz_image::ImageSize;

    #[rustfmt::skip]
    #[test]
    fn test_separable_filter_constant_border() -> Result<(), ImageError> {
        let size = ImageSize { width: 5, height: 5 };

        let mut img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        img.as_slice_mut()[12] = 9.0;

        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let kernel = vec![1.0 / 3.0; 3];

        separable_filter_with_strategy(
            &img, &mut dst, &kernel, &kernel, PaddingMode::Constant, ExecutionStrategy::Serial,
        )?;

        let expected = [
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 1.0, 1.0, 0.0,
            0.0, 1.0, 1.0, 1.0, 0.0,
            0.0, 1.0, 1.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        for (a, b) in dst.as_slice().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6);
        }

        Ok(())
    }

    #[test]
    fn test_separable_filter_reflect_keeps_constant_image() -> Result<(), ImageError> {
        let size = ImageSize { width: 4, height: 3 };
        let img = Image::<f32, 2>::from_size_val(size, 0.25)?;
        let mut dst = Image::<f32, 2>::from_size_val(size, 0.0)?;

        // the kernel is wider than the image, borders bounce several times
        let kernel = vec![1.0 / 9.0; 9];
        separable_filter(&img, &mut dst, &kernel, &kernel)?;

        for v in dst.as_slice() {
            assert!((v - 0.25).abs() < 1e-6);
        }

        Ok(())
    }

    #[test]
    fn test_separable_filter_serial_matches_parallel() -> Result<(), ImageError> {
        let size = ImageSize { width: 7, height: 6 };
        let data = (0..size.width * size.height * 3)
            .map(|i| ((i * 37) % 11) as f32)
            .collect();
        let img = Image::<f32, 3>::new(size, data)?;
        let kernel = [0.25, 0.5, 0.25];

        let mut serial = Image::<f32, 3>::from_size_val(size, 0.0)?;
        let mut parallel = Image::<f32, 3>::from_size_val(size, 0.0)?;
        separable_filter_with_strategy(
            &img,
            &mut serial,
            &kernel,
            &kernel,
            PaddingMode::Reflect,
            ExecutionStrategy::Serial,
        )?;
        separable_filter_with_strategy(
            &img,
            &mut parallel,
            &kernel,
            &kernel,
            PaddingMode::Reflect,
            ExecutionStrategy::Fixed(3),
        )?;

        assert_eq!(serial.as_slice(), parallel.as_slice());

        Ok(())
    }

    #[test]
    fn test_separable_filter_invalid_kernel() -> Result<(), ImageError> {
        let size = ImageSize { width: 2, height: 2 };
        let img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dst = img.clone();

        let res = separable_filter(&img, &mut dst, &[0.5, 0.5], &[1.0]);
        assert_eq!(res, Err(ImageError::InvalidKernelLength(2)));

        let res = separable_filter(&img, &mut dst, &[1.0], &[]);
        assert_eq!(res, Err(ImageError::InvalidKernelLength(0)));

        Ok(())
    }

    #[test]
    fn test_separable_filter_size_mismatch() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0.0)?;
        let mut dst = Image::<f32, 1>::from_size_val(ImageSize { width: 3, height: 2 }, 0.0)?;

        let res = separable_filter(&img, &mut dst, &[1.0], &[1.0]);
        assert_eq!(res, Err(ImageError::InvalidImageSize(2, 2, 3, 2)));

        Ok(())
    }
}
