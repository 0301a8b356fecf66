use crate::padding::PaddingMode;

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size.saturating_sub(1)) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Compute the radius that covers `truncate` standard deviations, `floor(truncate * sigma + 0.5)`.
///
/// Products too large for `usize` saturate.
pub fn gaussian_kernel_radius(sigma: f32, truncate: f32) -> usize {
    (truncate * sigma + 0.5).floor().max(0.0) as usize
}

/// Compute the odd kernel size that covers `truncate` standard deviations on each side.
///
/// The kernel size is `2 * radius + 1`, see [`gaussian_kernel_radius`].
///
/// # Example
///
/// ```
/// use nnviz_imgproc::filter::kernels::gaussian_kernel_size;
///
/// assert_eq!(gaussian_kernel_size(1.0, 4.0), 9);
/// assert_eq!(gaussian_kernel_size(8.0, 4.0), 65);
/// ```
pub fn gaussian_kernel_size(sigma: f32, truncate: f32) -> usize {
    gaussian_kernel_radius(sigma, truncate)
        .saturating_mul(2)
        .saturating_add(1)
}

/// Fold a centered kernel wider than an axis of `len` pixels onto a kernel of `2 * len + 1` taps.
///
/// Every tap whose offset reads the same pixel under `border` for all positions of
/// the axis is accumulated in a single tap, so filtering with the folded kernel
/// gives the same result as filtering with the original one. Kernels with a
/// radius below `len` are returned unchanged.
pub fn fold_kernel(kernel: &[f32], len: usize, border: PaddingMode) -> Vec<f32> {
    let radius = kernel.len() / 2;
    if len == 0 || radius < len {
        return kernel.to_vec();
    }

    let len = len as isize;
    // the reflecting modes repeat with this period
    let period = match border {
        PaddingMode::Reflect => 2 * len,
        PaddingMode::Reflect101 => (2 * len - 2).max(1),
        PaddingMode::Wrap => len,
        PaddingMode::Constant | PaddingMode::Replicate => 1,
    };

    let mut folded = vec![0.0; 2 * len as usize + 1];
    for (i, &k) in kernel.iter().enumerate() {
        let offset = i as isize - radius as isize;
        let offset = match border {
            // never reaches a pixel of the axis
            PaddingMode::Constant if offset.abs() >= len => continue,
            PaddingMode::Constant => offset,
            PaddingMode::Replicate => offset.clamp(1 - len, len - 1),
            PaddingMode::Reflect | PaddingMode::Reflect101 | PaddingMode::Wrap => {
                let m = offset.rem_euclid(period);
                if m >= len {
                    m - period
                } else {
                    m
                }
            }
        };
        folded[(offset + len) as usize] += k;
    }
    folded
}
