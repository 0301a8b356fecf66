use nnviz_image::{Image, ImageError};

use crate::parallel;

/// Colormaps used to render single channel heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Black to white.
    Gray,
    /// Blue, cyan, yellow, red.
    #[default]
    Jet,
    /// Black, red, yellow, white.
    Hot,
}

impl ColorMap {
    /// Map a value in [0, 1] to an RGB triplet in [0, 1]. Values outside the range are clamped.
    pub fn rgb(&self, value: f32) -> [f32; 3] {
        let x = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let ramp = |v: f32| v.clamp(0.0, 1.0);
        match self {
            ColorMap::Gray => [x, x, x],
            ColorMap::Jet => [
                ramp(1.5 - (4.0 * x - 3.0).abs()),
                ramp(1.5 - (4.0 * x - 2.0).abs()),
                ramp(1.5 - (4.0 * x - 1.0).abs()),
            ],
            ColorMap::Hot => [ramp(3.0 * x), ramp(3.0 * x - 1.0), ramp(3.0 * x - 2.0)],
        }
    }
}

/// Colorize a single channel image.
///
/// # Arguments
///
/// * `src` - The input heatmap with values in [0, 1] and shape (H, W, 1).
/// * `dst` - The output RGB image with values in [0, 1] and shape (H, W, 3).
/// * `colormap` - The colormap to apply.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` differ in size.
pub fn apply_colormap(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 3>,
    colormap: ColorMap,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&colormap.rgb(src_pixel[0]));
    });

    Ok(())
}
