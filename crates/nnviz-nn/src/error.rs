/// An error type for the neural network module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NnError {
    /// The flat input buffer does not hold the number of values of the declared shape.
    #[error("Data length ({actual}) does not match the expected shape {shape:?} ({expected} values)")]
    DataLength {
        /// Shape the data was expected to have.
        shape: Vec<usize>,
        /// Number of values implied by `shape`.
        expected: usize,
        /// Number of values received.
        actual: usize,
    },

    /// A layer cannot be connected after the previous one.
    #[error("Cannot connect layer '{layer}': {reason}")]
    IncompatibleLayer {
        /// Name of the layer that failed to connect.
        layer: String,
        /// Human readable cause.
        reason: String,
    },

    /// The layer or model does not define a gradient.
    #[error("'{0}' is not differentiable")]
    NotDifferentiable(String),

    /// Two layers in the same network share a name.
    #[error("Layer name '{0}' is already used in the network")]
    DuplicateLayerName(String),

    /// A layer parameter is invalid.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The network has nothing to evaluate.
    #[error("Network has no {0}")]
    EmptyNetwork(&'static str),
}

/// Number of values held by a tensor of the given shape.
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Check that `data` holds exactly the values of `shape`.
pub fn check_len(data: &[f32], shape: &[usize]) -> Result<(), NnError> {
    let expected = num_elements(shape);
    if data.len() != expected {
        return Err(NnError::DataLength {
            shape: shape.to_vec(),
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
