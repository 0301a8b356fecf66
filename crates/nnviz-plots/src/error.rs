use nnviz_image::ImageError;
use nnviz_nn::NnError;

/// An error type for the plotting module.
#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    /// Unknown saliency map mode.
    #[error("'{0}' is invalid value for mode argument. Expected mode to be 'heatmap' or 'raw'")]
    InvalidMode(String),

    /// The blur radius is not a positive finite number.
    #[error("sigma must be a positive finite number, got {0}")]
    InvalidSigma(f32),

    /// The blend opacity is outside of [0, 1].
    #[error("alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f32),

    /// The model has several output layers.
    #[error("Cannot build saliency map for the network that has more than one output layer.")]
    MultipleOutputs,

    /// The model has several input layers.
    #[error("Cannot build saliency map for the network that has more than one input layer.")]
    MultipleInputs,

    /// The model does not take (height, width, channels) inputs.
    #[error(
        "Input layer has to be 3 dimensions (height, width, channels), but network expects {0} dimensional input"
    )]
    InvalidInputDimensions(usize),

    /// The image does not match the model input.
    #[error("Image of shape {actual:?} does not match the network input shape {expected:?}")]
    ShapeMismatch {
        /// Input shape of the model.
        expected: Vec<usize>,
        /// Shape of the image.
        actual: Vec<usize>,
    },

    /// The model cannot be differentiated with respect to its input.
    #[error("Cannot compute the gradient of the network output: {0} is not differentiable")]
    Differentiation(String),

    /// The model produced no scores.
    #[error("Network returned an empty output")]
    EmptyOutput,

    /// The input gradient holds NaN or infinite values.
    #[error("Input gradient has {0} non finite values")]
    NonFiniteGradient(usize),

    /// Weight matrix without rows or columns.
    #[error("Cannot plot an empty weight matrix")]
    EmptyMatrix,

    /// Weight data does not match the matrix dimensions.
    #[error("Weight data has {actual} values, expected {rows}x{cols}")]
    MatrixShape {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
        /// Number of values received.
        actual: usize,
    },

    /// Zero sized cells.
    #[error("cell size must be > 0")]
    InvalidCellSize,

    /// The maximum weight override is not a positive finite number.
    #[error("max weight must be a positive finite number, got {0}")]
    InvalidMaxWeight(f32),

    /// Image processing failure.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Network evaluation failure.
    #[error(transparent)]
    Nn(NnError),

    /// Invalid configuration document.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Writing the plot failed.
    #[error("Failed to write the plot: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NnError> for PlotError {
    fn from(err: NnError) -> Self {
        match err {
            NnError::NotDifferentiable(name) => PlotError::Differentiation(name),
            err => PlotError::Nn(err),
        }
    }
}
