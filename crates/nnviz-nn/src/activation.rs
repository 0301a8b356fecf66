use crate::{
    error::{check_len, NnError},
    layer::Layer,
};

macro_rules! named_layer {
    ($ty:ident) => {
        impl $ty {
            /// Create the layer.
            pub fn new() -> Self {
                Self::default()
            }

            /// Set the name of the layer.
            pub fn with_name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }
        }
    };
}

/// Rectified linear unit, `max(x, 0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relu {
    name: Option<String>,
}

named_layer!(Relu);

impl Layer for Relu {
    fn kind(&self) -> &'static str {
        "relu"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        check_len(input, input_shape)?;
        Ok(input.iter().map(|&x| x.max(0.0)).collect())
    }

    fn backward(
        &self,
        input: &[f32],
        _input_shape: &[usize],
        _output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        Ok(input
            .iter()
            .zip(grad_output.iter())
            .map(|(&x, &g)| if x > 0.0 { g } else { 0.0 })
            .collect())
    }
}

/// Logistic sigmoid, `1 / (1 + exp(-x))`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sigmoid {
    name: Option<String>,
}

named_layer!(Sigmoid);

impl Layer for Sigmoid {
    fn kind(&self) -> &'static str {
        "sigmoid"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        check_len(input, input_shape)?;
        Ok(input.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).collect())
    }

    fn backward(
        &self,
        _input: &[f32],
        _input_shape: &[usize],
        output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        Ok(output
            .iter()
            .zip(grad_output.iter())
            .map(|(&y, &g)| g * y * (1.0 - y))
            .collect())
    }
}

/// Softmax over a `[N]` vector of scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Softmax {
    name: Option<String>,
}

named_layer!(Softmax);

impl Layer for Softmax {
    fn kind(&self) -> &'static str {
        "softmax"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        if input_shape.len() != 1 {
            return Err(NnError::IncompatibleLayer {
                layer: self.name().unwrap_or(self.kind()).to_string(),
                reason: format!("expects a flat vector, got {input_shape:?}"),
            });
        }
        Ok(input_shape.to_vec())
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        self.output_shape(input_shape)?;
        check_len(input, input_shape)?;

        let max = input.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp = input.iter().map(|&x| (x - max).exp()).collect::<Vec<_>>();
        let sum = exp.iter().sum::<f32>();
        Ok(exp.into_iter().map(|e| e / sum).collect())
    }

    fn backward(
        &self,
        _input: &[f32],
        _input_shape: &[usize],
        output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        // J = diag(y) - y y^T
        let dot = output
            .iter()
            .zip(grad_output.iter())
            .map(|(&y, &g)| y * g)
            .sum::<f32>();
        Ok(output
            .iter()
            .zip(grad_output.iter())
            .map(|(&y, &g)| y * (g - dot))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relu() -> Result<(), NnError> {
        let relu = Relu::new();
        let input = [-1.0, 0.0, 2.0];
        let output = relu.forward(&input, &[3])?;
        assert_eq!(output, vec![0.0, 0.0, 2.0]);
        assert_eq!(
            relu.backward(&input, &[3], &output, &[5.0, 5.0, 5.0])?,
            vec![0.0, 0.0, 5.0]
        );
        Ok(())
    }

    #[test]
    fn test_sigmoid() -> Result<(), NnError> {
        let sigmoid = Sigmoid::new();
        let output = sigmoid.forward(&[0.0], &[1])?;
        assert_relative_eq!(output[0], 0.5);
        let grad = sigmoid.backward(&[0.0], &[1], &output, &[1.0])?;
        assert_relative_eq!(grad[0], 0.25);
        Ok(())
    }

    #[test]
    fn test_softmax() -> Result<(), NnError> {
        let softmax = Softmax::new();
        let input = [1.0, 2.0, 3.0];
        let output = softmax.forward(&input, &[3])?;

        // from pytorch
        let expected = [0.09003057, 0.24472848, 0.66524094];
        for (a, e) in output.iter().zip(expected.iter()) {
            assert_relative_eq!(a, e, epsilon = 1e-6);
        }
        assert_relative_eq!(output.iter().sum::<f32>(), 1.0, epsilon = 1e-6);

        // a constant shift of the gradient has no effect
        let grad = softmax.backward(&input, &[3], &output, &[1.0, 1.0, 1.0])?;
        for g in grad {
            assert_relative_eq!(g, 0.0, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_softmax_large_scores_are_stable() -> Result<(), NnError> {
        let output = Softmax::new().forward(&[1000.0, 1000.0], &[2])?;
        assert_eq!(output, vec![0.5, 0.5]);
        Ok(())
    }

    #[test]
    fn test_softmax_rejects_images() {
        assert!(matches!(
            Softmax::new().output_shape(&[2, 2, 1]),
            Err(NnError::IncompatibleLayer { .. })
        ));
    }

    #[test]
    fn test_named_layer() {
        assert_eq!(Relu::new().with_name("act").name(), Some("act"));
        assert_eq!(Sigmoid::new().name(), None);
    }
}
