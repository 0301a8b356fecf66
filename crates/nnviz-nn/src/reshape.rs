use crate::{
    error::{check_len, num_elements, NnError},
    layer::Layer,
};

/// Reinterpret the input with a new shape; flattens when no target shape is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reshape {
    shape: Option<Vec<usize>>,
    name: Option<String>,
}

impl Reshape {
    /// Flatten any input into a `[N]` vector.
    pub fn flatten() -> Self {
        Self::default()
    }

    /// Reshape the input to `shape`, which must hold the same number of values.
    pub fn new(shape: impl Into<Vec<usize>>) -> Self {
        Self {
            shape: Some(shape.into()),
            name: None,
        }
    }

    /// Set the name of the layer.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Layer for Reshape {
    fn kind(&self) -> &'static str {
        "reshape"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        let n = num_elements(input_shape);
        match &self.shape {
            None => Ok(vec![n]),
            Some(shape) if num_elements(shape) == n => Ok(shape.clone()),
            Some(shape) => Err(NnError::IncompatibleLayer {
                layer: self.name().unwrap_or(self.kind()).to_string(),
                reason: format!("cannot reshape {input_shape:?} into {shape:?}"),
            }),
        }
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        self.output_shape(input_shape)?;
        check_len(input, input_shape)?;
        Ok(input.to_vec())
    }

    fn backward(
        &self,
        _input: &[f32],
        _input_shape: &[usize],
        _output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        Ok(grad_output.to_vec())
    }
}

type LambdaFn = dyn Fn(&[f32]) -> Vec<f32> + Send + Sync;

/// Shape preserving layer defined by an arbitrary closure.
///
/// The closure is opaque, so the layer has no gradient.
pub struct Lambda {
    f: Box<LambdaFn>,
    name: Option<String>,
}

impl Lambda {
    /// Wrap `f`; it must return as many values as it receives.
    pub fn new(f: impl Fn(&[f32]) -> Vec<f32> + Send + Sync + 'static) -> Self {
        Self {
            f: Box::new(f),
            name: None,
        }
    }

    /// Set the name of the layer.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Layer for Lambda {
    fn kind(&self) -> &'static str {
        "lambda"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        check_len(input, input_shape)?;
        let output = (self.f)(input);
        check_len(&output, input_shape)?;
        Ok(output)
    }
}
