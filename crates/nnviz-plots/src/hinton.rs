use nnviz_image::{Image, ImageSize};
use nnviz_imgproc::draw::draw_filled_rect;

use crate::{config::HintonConfig, error::PlotError};

const BACKGROUND: [u8; 3] = [128, 128, 128];
const POSITIVE: [u8; 3] = [255, 255, 255];
const NEGATIVE: [u8; 3] = [0, 0, 0];

/// Render a weight matrix as a Hinton diagram.
///
/// Every weight gets a `cell_size` square cell on a gray canvas. The weight is
/// drawn as a centered square whose area is proportional to its magnitude,
/// white for positive and black for negative values.
///
/// # Arguments
///
/// * `weights` - Row-major matrix values.
/// * `rows` - Number of rows of the matrix.
/// * `cols` - Number of columns of the matrix.
/// * `config` - Cell size and the magnitude of a full cell.
///
/// # Returns
///
/// An RGB image of `cols * cell_size` by `rows * cell_size` pixels.
///
/// # Example
///
/// ```
/// use nnviz_plots::{config::HintonConfig, hinton::hinton};
///
/// let plot = hinton(&[1.0, -0.5, 0.25, 0.0], 2, 2, &HintonConfig::default())?;
/// assert_eq!(plot.shape(), [32, 32, 3]);
/// # Ok::<(), nnviz_plots::PlotError>(())
/// ```
pub fn hinton(
    weights: &[f32],
    rows: usize,
    cols: usize,
    config: &HintonConfig,
) -> Result<Image<u8, 3>, PlotError> {
    config.validate()?;

    if rows == 0 || cols == 0 {
        return Err(PlotError::EmptyMatrix);
    }
    if weights.len() != rows * cols {
        return Err(PlotError::MatrixShape {
            rows,
            cols,
            actual: weights.len(),
        });
    }

    let max_weight = config.max_weight.unwrap_or_else(|| max_weight(weights));
    log::debug!("hinton diagram {rows}x{cols} with max weight {max_weight}");

    let cell = config.cell_size;
    let size = ImageSize {
        width: cols * cell,
        height: rows * cell,
    };
    let mut canvas = Image::from_size_val(size, 0u8)?;
    canvas
        .as_slice_mut()
        .chunks_exact_mut(3)
        .for_each(|pixel| pixel.copy_from_slice(&BACKGROUND));

    for (i, &w) in weights.iter().enumerate() {
        // non finite weights are left blank
        if !w.is_finite() || w == 0.0 {
            continue;
        }

        let side = (cell as f32 * (w.abs() / max_weight).min(1.0).sqrt()).round() as usize;
        if side == 0 {
            continue;
        }

        let offset = (cell - side) / 2;
        let x = ((i % cols) * cell + offset) as i64;
        let y = ((i / cols) * cell + offset) as i64;
        let color = if w > 0.0 { POSITIVE } else { NEGATIVE };
        draw_filled_rect(
            &mut canvas,
            (x, y),
            (x + side as i64, y + side as i64),
            color,
        );
    }

    Ok(canvas)
}

/// Smallest power of two not below the largest magnitude; 1 for a zero matrix.
fn max_weight(weights: &[f32]) -> f32 {
    let max_abs = weights
        .iter()
        .filter(|w| w.is_finite())
        .fold(0.0f32, |acc, w| acc.max(w.abs()));
    if max_abs == 0.0 {
        return 1.0;
    }
    2f32.powf(max_abs.log2().ceil())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(img: &Image<u8, 3>, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * img.cols() + x) * 3;
        let data = img.as_slice();
        [data[idx], data[idx + 1], data[idx + 2]]
    }

    fn count(img: &Image<u8, 3>, color: [u8; 3]) -> usize {
        img.as_slice()
            .chunks_exact(3)
            .filter(|p| *p == color.as_slice())
            .count()
    }

    #[test]
    fn test_max_weight() {
        assert_eq!(max_weight(&[0.0, 0.0]), 1.0);
        assert_eq!(max_weight(&[0.3, -0.1]), 0.5);
        assert_eq!(max_weight(&[1.0]), 1.0);
        assert_eq!(max_weight(&[-3.0, 2.0]), 4.0);
    }

    #[test]
    fn test_hinton() -> Result<(), PlotError> {
        let config = HintonConfig {
            cell_size: 8,
            max_weight: None,
        };
        let plot = hinton(&[1.0, -0.25, 0.0, 0.5], 2, 2, &config)?;
        assert_eq!(plot.shape(), [16, 16, 3]);

        // full white cell
        assert_eq!(pixel(&plot, 0, 0), POSITIVE);
        assert_eq!(pixel(&plot, 7, 7), POSITIVE);

        // half side black square in the top right cell
        assert_eq!(pixel(&plot, 9, 1), BACKGROUND);
        assert_eq!(pixel(&plot, 10, 2), NEGATIVE);
        assert_eq!(pixel(&plot, 13, 5), NEGATIVE);
        assert_eq!(pixel(&plot, 14, 6), BACKGROUND);

        // zero weight draws nothing
        assert_eq!(pixel(&plot, 4, 12), BACKGROUND);

        // round(8 * sqrt(0.5)) = 6
        assert_eq!(count(&plot, POSITIVE), 64 + 36);
        assert_eq!(count(&plot, NEGATIVE), 16);
        Ok(())
    }

    #[test]
    fn test_hinton_max_weight_override() -> Result<(), PlotError> {
        let config = HintonConfig {
            cell_size: 4,
            max_weight: Some(4.0),
        };
        let plot = hinton(&[-1.0, 8.0], 1, 2, &config)?;
        assert_eq!(plot.shape(), [4, 8, 3]);
        assert_eq!(count(&plot, NEGATIVE), 4);
        // magnitudes above the max fill the cell
        assert_eq!(count(&plot, POSITIVE), 16);
        Ok(())
    }

    #[test]
    fn test_hinton_zero_matrix() -> Result<(), PlotError> {
        let plot = hinton(&[0.0; 6], 2, 3, &HintonConfig::default())?;
        assert_eq!(plot.shape(), [32, 48, 3]);
        assert_eq!(count(&plot, BACKGROUND), 32 * 48);
        Ok(())
    }

    #[test]
    fn test_hinton_errors() {
        let config = HintonConfig::default();
        assert!(matches!(
            hinton(&[], 0, 3, &config),
            Err(PlotError::EmptyMatrix)
        ));
        assert!(matches!(
            hinton(&[1.0, 2.0, 3.0], 2, 2, &config),
            Err(PlotError::MatrixShape { actual: 3, .. })
        ));
        let config = HintonConfig {
            cell_size: 0,
            max_weight: None,
        };
        assert!(matches!(
            hinton(&[1.0], 1, 1, &config),
            Err(PlotError::InvalidCellSize)
        ));
    }
}
