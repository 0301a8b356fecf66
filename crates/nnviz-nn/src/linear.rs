use crate::{
    error::{check_len, NnError},
    layer::Layer,
};

/// Linear layer implementation.
///
/// Linear layer implemented using `matrixmultiply::sgemm`.
///
/// # Arguments
///
/// * `src` - Input tensor of shape `[B, D]`
/// * `weight` - Weight tensor of shape `[N, D]`
/// * `bias` - Bias tensor of shape `[N]`
/// * `dst` - Output tensor of shape `[B, N]`
/// * `batch_size` - Batch size
/// * `input_dim` - Input dimension
/// * `output_dim` - Output dimension
///
/// # Example
///
/// ```
/// use nnviz_nn::linear::linear_layer_gemm;
///
/// let src = [[1.0, 2.0, 3.0]];
/// let weight = [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]];
/// let bias = [0.1, 0.2];
///
/// let mut dst = [[0.0, 0.0]];
///
/// linear_layer_gemm(
///     src.as_flattened(),
///     weight.as_flattened(),
///     &bias,
///     dst.as_flattened_mut(),
///     1,
///     3,
///     2,
/// );
///
/// assert_eq!(dst, [[1.5000001, 3.4]]);
/// ```
pub fn linear_layer_gemm(
    src: &[f32],     // Shape: [B, D] flattened
    weight: &[f32],  // Shape: [N, D] flattened (row-major format)
    bias: &[f32],    // Shape: [N]
    dst: &mut [f32], // Shape: [B, N] flattened
    batch_size: usize,
    input_dim: usize,
    output_dim: usize,
) {
    assert_eq!(src.len(), batch_size * input_dim, "Input size mismatch");
    assert_eq!(dst.len(), batch_size * output_dim, "Output size mismatch");
    assert_eq!(weight.len(), output_dim * input_dim, "Weight size mismatch");
    assert_eq!(bias.len(), output_dim, "Bias size mismatch");

    let m = batch_size;
    let k = input_dim;
    let n = output_dim;

    // 1. Set bias for each output row
    for output_row in dst.chunks_exact_mut(output_dim) {
        output_row.copy_from_slice(bias);
    }

    // 2. dst = src * weight^T + bias (beta = 1.0 adds to the bias-initialized output)
    unsafe {
        matrixmultiply::sgemm(
            /* m */ m,
            /* k */ k,
            /* n */ n,
            /* alpha */ 1.0,
            /* a */ src.as_ptr(),
            /* rsa */ k as isize,
            /* csa */ 1,
            /* b */ weight.as_ptr(),
            /* rsb */ 1,
            /* csb */ k as isize,
            /* beta */ 1.0,
            /* c */ dst.as_mut_ptr(),
            /* rsc */ n as isize,
            /* csc */ 1,
        );
    }
}

/// Gradient of a linear layer with respect to its input.
///
/// Computes `grad_src = grad_dst * weight`.
///
/// # Arguments
///
/// * `grad_dst` - Gradient w.r.t. the output, shape `[B, N]`
/// * `weight` - Weight tensor of shape `[N, D]`
/// * `grad_src` - Gradient w.r.t. the input, shape `[B, D]`
/// * `batch_size` - Batch size
/// * `input_dim` - Input dimension
/// * `output_dim` - Output dimension
pub fn linear_layer_gemm_backward(
    grad_dst: &[f32],
    weight: &[f32],
    grad_src: &mut [f32],
    batch_size: usize,
    input_dim: usize,
    output_dim: usize,
) {
    assert_eq!(grad_dst.len(), batch_size * output_dim, "Output size mismatch");
    assert_eq!(grad_src.len(), batch_size * input_dim, "Input size mismatch");
    assert_eq!(weight.len(), output_dim * input_dim, "Weight size mismatch");

    let m = batch_size;
    let k = output_dim;
    let n = input_dim;

    unsafe {
        matrixmultiply::sgemm(
            /* m */ m,
            /* k */ k,
            /* n */ n,
            /* alpha */ 1.0,
            /* a */ grad_dst.as_ptr(),
            /* rsa */ k as isize,
            /* csa */ 1,
            /* b */ weight.as_ptr(),
            /* rsb */ n as isize,
            /* csb */ 1,
            /* beta */ 0.0,
            /* c */ grad_src.as_mut_ptr(),
            /* rsc */ n as isize,
            /* csc */ 1,
        );
    }
}

/// Fully-connected layer mapping a `[D]` vector to `[N]` scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weight: Vec<f32>,
    bias: Vec<f32>,
    input_dim: usize,
    output_dim: usize,
    name: Option<String>,
}

impl Linear {
    /// Create a linear layer from a row-major `[output_dim, input_dim]` weight and a bias.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::InvalidParameter`] if the parameter lengths do not match the dimensions.
    pub fn new(
        weight: Vec<f32>,
        bias: Vec<f32>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self, NnError> {
        if weight.len() != input_dim * output_dim {
            return Err(NnError::InvalidParameter(format!(
                "linear weight has {} values, expected {output_dim}x{input_dim}",
                weight.len()
            )));
        }
        if bias.len() != output_dim {
            return Err(NnError::InvalidParameter(format!(
                "linear bias has {} values, expected {output_dim}",
                bias.len()
            )));
        }

        Ok(Self {
            weight,
            bias,
            input_dim,
            output_dim,
            name: None,
        })
    }

    /// Set the name of the layer.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The row-major `[output_dim, input_dim]` weight.
    pub fn weight(&self) -> &[f32] {
        &self.weight
    }

    /// The `[output_dim]` bias.
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }
}

impl Layer for Linear {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        if input_shape != [self.input_dim].as_slice() {
            return Err(NnError::IncompatibleLayer {
                layer: self.name().unwrap_or(self.kind()).to_string(),
                reason: format!(
                    "expects input of shape [{}], got {input_shape:?}",
                    self.input_dim
                ),
            });
        }
        Ok(vec![self.output_dim])
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        self.output_shape(input_shape)?;
        check_len(input, input_shape)?;

        let mut dst = vec![0.0; self.output_dim];
        linear_layer_gemm(
            input,
            &self.weight,
            &self.bias,
            &mut dst,
            1,
            self.input_dim,
            self.output_dim,
        );
        Ok(dst)
    }

    fn backward(
        &self,
        _input: &[f32],
        _input_shape: &[usize],
        _output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        check_len(grad_output, &[self.output_dim])?;

        let mut grad_input = vec![0.0; self.input_dim];
        linear_layer_gemm_backward(
            grad_output,
            &self.weight,
            &mut grad_input,
            1,
            self.input_dim,
            self.output_dim,
        );
        Ok(grad_input)
    }
}
