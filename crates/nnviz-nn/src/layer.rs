use crate::error::NnError;

/// A network layer operating on a single sample.
///
/// Tensors are flat `f32` buffers in row-major order. Shapes never include the
/// batch dimension; images use the (height, width, channels) layout.
pub trait Layer: Send + Sync {
    /// Short lowercase identifier of the layer type, e.g. `"linear"`.
    ///
    /// Containers derive default layer names from it.
    fn kind(&self) -> &'static str;

    /// Explicit name of the layer, if one was set.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Shape produced by the layer for the given input shape.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::IncompatibleLayer`] when the layer cannot accept `input_shape`.
    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError>;

    /// Propagate `input` of shape `input_shape` through the layer.
    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError>;

    /// Vector-Jacobian product of the layer.
    ///
    /// Given the `input` and `output` of a previous [`Layer::forward`] call and the
    /// gradient of a scalar with respect to the output, returns the gradient of that
    /// scalar with respect to the input.
    ///
    /// The default implementation reports the layer as not differentiable.
    fn backward(
        &self,
        input: &[f32],
        input_shape: &[usize],
        output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        let _ = (input, input_shape, output, grad_output);
        Err(NnError::NotDifferentiable(
            self.name().unwrap_or(self.kind()).to_string(),
        ))
    }
}
