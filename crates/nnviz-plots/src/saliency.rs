use nnviz_image::{Image, ImageError};
use nnviz_imgproc::{
    colormap::{apply_colormap, ColorMap},
    enhance::add_weighted,
    filter::gaussian_filter,
    normalize::normalize_min_max,
    padding::PaddingMode,
    parallel::ExecutionStrategy,
};
use nnviz_nn::{error::check_len, Model};

use crate::{
    config::{SaliencyConfig, SaliencyMode},
    error::PlotError,
};

/// Input gradient map of the predicted class.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    /// Normalized map in [0, 1] with the size of the input image.
    pub map: Image<f32, 1>,
    /// Index of the largest score.
    pub predicted_class: usize,
    /// Score of the predicted class.
    pub score: f32,
    /// Opacity used by [`SaliencyMap::overlay`].
    pub alpha: f32,
}

impl SaliencyMap {
    /// Colorize the map.
    pub fn heatmap(&self, colormap: ColorMap) -> Result<Image<f32, 3>, PlotError> {
        let mut heatmap = Image::from_size_val(self.map.size(), 0.0)?;
        apply_colormap(&self.map, &mut heatmap, colormap)?;
        Ok(heatmap)
    }

    /// Blend the colorized map over `image`.
    ///
    /// The image is expected in [0, 1] with 1 or 3 channels; a single channel is
    /// broadcast to RGB. Each pixel is `(1 - alpha) * image + alpha * heatmap`.
    pub fn overlay<const C: usize>(
        &self,
        image: &Image<f32, C>,
        colormap: ColorMap,
    ) -> Result<Image<f32, 3>, PlotError> {
        if C != 1 && C != 3 {
            return Err(ImageError::UnsupportedChannels(C).into());
        }
        if image.size() != self.map.size() {
            return Err(ImageError::InvalidImageSize(
                image.cols(),
                image.rows(),
                self.map.cols(),
                self.map.rows(),
            )
            .into());
        }

        let rgb = if C == 3 {
            image.as_slice().to_vec()
        } else {
            image.as_slice().iter().flat_map(|&v| [v, v, v]).collect()
        };
        let rgb = Image::<f32, 3>::new(image.size(), rgb)?;

        let heatmap = self.heatmap(colormap)?;
        let mut dst = Image::from_size_val(image.size(), 0.0)?;
        add_weighted(&rgb, 1.0 - self.alpha, &heatmap, self.alpha, 0.0, &mut dst)?;
        Ok(dst)
    }
}

/// Compute the saliency map of `image` with the default configuration and the
/// given blur radius and overlay opacity.
///
/// # Arguments
///
/// * `model` - A differentiable model with a single (height, width, channels) input.
/// * `image` - The input image, its shape must match the model input.
/// * `sigma` - Standard deviation of the Gaussian blur, in pixels.
/// * `alpha` - Opacity of the heatmap in [0, 1].
///
/// # Example
///
/// ```
/// use nnviz_image::{Image, ImageSize};
/// use nnviz_nn::{linear::Linear, network::Sequential, reshape::Reshape};
/// use nnviz_plots::saliency::compute_saliency;
///
/// let network = Sequential::new([2, 2, 1])
///     .push(Reshape::flatten())?
///     .push(Linear::new(vec![1.0, -2.0, 0.5, 0.0], vec![0.0], 4, 1)?)?;
///
/// let image = Image::<f32, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0.5)?;
/// let saliency = compute_saliency(&network, &image, 1.0, 0.5)?;
///
/// assert_eq!(saliency.map.shape(), [2, 2, 1]);
/// assert_eq!(saliency.predicted_class, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compute_saliency<M, const C: usize>(
    model: &M,
    image: &Image<f32, C>,
    sigma: f32,
    alpha: f32,
) -> Result<SaliencyMap, PlotError>
where
    M: Model + ?Sized,
{
    let config = SaliencyConfig {
        sigma,
        alpha,
        ..Default::default()
    };
    compute_saliency_with_config(model, image, &config)
}

/// Compute the saliency map of `image` for the class predicted by `model`.
///
/// The map is the gradient of the top score with respect to the input pixels,
/// reduced over the channels, optionally smoothed and normalized to [0, 1].
pub fn compute_saliency_with_config<M, const C: usize>(
    model: &M,
    image: &Image<f32, C>,
    config: &SaliencyConfig,
) -> Result<SaliencyMap, PlotError>
where
    M: Model + ?Sized,
{
    config.validate()?;
    log::debug!(
        "saliency map: mode={} sigma={} alpha={} reduction={:?}",
        config.mode,
        config.sigma,
        config.alpha,
        config.reduction
    );

    if model.num_outputs() != 1 {
        return Err(PlotError::MultipleOutputs);
    }

    let input_shapes = model.input_shapes();
    let input_shape = match input_shapes.as_slice() {
        [shape] => shape,
        _ => return Err(PlotError::MultipleInputs),
    };
    if input_shape.len() != 3 {
        return Err(PlotError::InvalidInputDimensions(input_shape.len()));
    }

    let image_shape = image.shape();
    if input_shape.as_slice() != image_shape.as_slice() {
        return Err(PlotError::ShapeMismatch {
            expected: input_shape.clone(),
            actual: image_shape.to_vec(),
        });
    }

    let input = image.as_slice();
    let scores = model.forward(input)?;
    let (predicted_class, score) = argmax(&scores).ok_or(PlotError::EmptyOutput)?;
    log::debug!("predicted class {predicted_class} with score {score}");

    let mut grad_output = vec![0.0; scores.len()];
    grad_output[predicted_class] = 1.0;
    let grad = model.backward(input, &grad_output)?;
    check_len(&grad, input_shape)?;

    let non_finite = grad.iter().filter(|g| !g.is_finite()).count();
    if non_finite > 0 {
        return Err(PlotError::NonFiniteGradient(non_finite));
    }

    let reduced = grad
        .chunks_exact(C)
        .map(|pixel| config.reduction.reduce(pixel))
        .collect();
    let mut gradient_map = Image::<f32, 1>::new(image.size(), reduced)?;

    if config.mode == SaliencyMode::Heatmap {
        let mut blurred = Image::from_size_val(image.size(), 0.0)?;
        gaussian_filter(
            &gradient_map,
            &mut blurred,
            config.sigma,
            PaddingMode::Reflect,
            ExecutionStrategy::Serial,
        )?;
        gradient_map = blurred;
    }

    let mut map = Image::from_size_val(image.size(), 0.0)?;
    if normalize_min_max(&gradient_map, &mut map, 0.0, 1.0)? {
        log::warn!("saliency map is constant, the input gradient carries no information");
    }

    Ok(SaliencyMap {
        map,
        predicted_class,
        score,
        alpha: config.alpha,
    })
}

// first index wins on ties
fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best = (0, *scores.first()?);
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > best.1 {
            best = (i, s);
        }
    }
    Some(best)
}
