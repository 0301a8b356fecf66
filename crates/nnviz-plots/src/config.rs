use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlotError;

/// How the input gradient is turned into a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaliencyMode {
    /// Gaussian smoothed gradient magnitude.
    #[default]
    Heatmap,
    /// Gradient magnitude without smoothing.
    Raw,
}

impl FromStr for SaliencyMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heatmap" => Ok(SaliencyMode::Heatmap),
            "raw" => Ok(SaliencyMode::Raw),
            _ => Err(PlotError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for SaliencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaliencyMode::Heatmap => write!(f, "heatmap"),
            SaliencyMode::Raw => write!(f, "raw"),
        }
    }
}

/// Reduction of the per-channel gradient of a pixel to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelReduction {
    /// Largest absolute value over the channels.
    #[default]
    MaxAbs,
    /// Largest value over the channels.
    Max,
    /// Sum of absolute values over the channels.
    Sum,
}

impl ChannelReduction {
    pub(crate) fn reduce(&self, values: &[f32]) -> f32 {
        match self {
            ChannelReduction::MaxAbs => values.iter().fold(0.0, |acc, v| acc.max(v.abs())),
            ChannelReduction::Max => values.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
            ChannelReduction::Sum => values.iter().map(|v| v.abs()).sum(),
        }
    }
}

/// Parameters of a saliency map.
///
/// # Example
///
/// ```
/// use nnviz_plots::config::{SaliencyConfig, SaliencyMode};
///
/// let config = SaliencyConfig::from_json(r#"{ "mode": "raw", "alpha": 0.3 }"#)?;
/// assert_eq!(config.mode, SaliencyMode::Raw);
/// assert_eq!(config.sigma, 8.0);
/// # Ok::<(), nnviz_plots::PlotError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaliencyConfig {
    /// Smoothing mode.
    pub mode: SaliencyMode,
    /// Standard deviation of the Gaussian blur, in pixels.
    pub sigma: f32,
    /// Opacity of the heatmap when it is drawn over the image.
    pub alpha: f32,
    /// Channel reduction of the gradient.
    pub reduction: ChannelReduction,
}

impl Default for SaliencyConfig {
    fn default() -> Self {
        Self {
            mode: SaliencyMode::Heatmap,
            sigma: 8.0,
            alpha: 0.5,
            reduction: ChannelReduction::MaxAbs,
        }
    }
}

impl SaliencyConfig {
    /// Parse and validate a JSON document; missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, PlotError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the value ranges.
    pub fn validate(&self) -> Result<(), PlotError> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(PlotError::InvalidSigma(self.sigma));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(PlotError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}

/// Parameters of a Hinton diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintonConfig {
    /// Side of the cell of a single weight, in pixels.
    pub cell_size: usize,
    /// Magnitude drawn as a full cell. Derived from the weights when unset.
    pub max_weight: Option<f32>,
}

impl Default for HintonConfig {
    fn default() -> Self {
        Self {
            cell_size: 16,
            max_weight: None,
        }
    }
}

impl HintonConfig {
    /// Parse and validate a JSON document; missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, PlotError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the value ranges.
    pub fn validate(&self) -> Result<(), PlotError> {
        if self.cell_size == 0 {
            return Err(PlotError::InvalidCellSize);
        }
        match self.max_weight {
            Some(w) if !(w.is_finite() && w > 0.0) => Err(PlotError::InvalidMaxWeight(w)),
            _ => Ok(()),
        }
    }
}
