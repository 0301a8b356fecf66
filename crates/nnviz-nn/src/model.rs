use crate::{
    error::{check_len, NnError},
    network::{MultiHead, Sequential},
};

/// A model mapping a single input tensor to class scores.
///
/// This is the interface attribution methods work against: they only need the
/// scores of a forward pass and the vector-Jacobian product w.r.t. the input.
pub trait Model {
    /// Shape of every input layer, batch dimension excluded.
    fn input_shapes(&self) -> Vec<Vec<usize>>;

    /// Number of output layers.
    fn num_outputs(&self) -> usize {
        1
    }

    /// Flat scores for one input sample.
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError>;

    /// Gradient of `dot(grad_output, forward(input))` with respect to `input`.
    ///
    /// Models without a gradient keep the default, which fails with
    /// [`NnError::NotDifferentiable`].
    fn backward(&self, input: &[f32], grad_output: &[f32]) -> Result<Vec<f32>, NnError> {
        let _ = (input, grad_output);
        Err(NnError::NotDifferentiable("model".to_string()))
    }
}

impl Model for Sequential {
    fn input_shapes(&self) -> Vec<Vec<usize>> {
        vec![self.input_shape().to_vec()]
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError> {
        Sequential::forward(self, input)
    }

    fn backward(&self, input: &[f32], grad_output: &[f32]) -> Result<Vec<f32>, NnError> {
        Sequential::backward(self, input, grad_output)
    }
}

impl Model for MultiHead {
    fn input_shapes(&self) -> Vec<Vec<usize>> {
        vec![self.trunk().input_shape().to_vec()]
    }

    fn num_outputs(&self) -> usize {
        self.heads().len()
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError> {
        MultiHead::forward(self, input)
    }

    fn backward(&self, input: &[f32], grad_output: &[f32]) -> Result<Vec<f32>, NnError> {
        MultiHead::backward(self, input, grad_output)
    }
}

type ModelFn = dyn Fn(&[f32]) -> Vec<f32> + Send + Sync;

/// An opaque, forward-only model defined by a closure.
pub struct FnModel {
    input_shape: Vec<usize>,
    f: Box<ModelFn>,
}

impl FnModel {
    /// Wrap `f`, which receives inputs of `input_shape` and returns scores.
    pub fn new(
        input_shape: impl Into<Vec<usize>>,
        f: impl Fn(&[f32]) -> Vec<f32> + Send + Sync + 'static,
    ) -> Self {
        Self {
            input_shape: input_shape.into(),
            f: Box::new(f),
        }
    }
}

impl Model for FnModel {
    fn input_shapes(&self) -> Vec<Vec<usize>> {
        vec![self.input_shape.clone()]
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError> {
        check_len(input, &self.input_shape)?;
        Ok((self.f)(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{activation::Relu, linear::Linear};

    #[test]
    fn test_sequential_model() -> Result<(), NnError> {
        let network = Sequential::new([2])
            .push(Linear::new(vec![2.0, -1.0], vec![0.5], 2, 1)?)?
            .push(Relu::new())?;
        let model: &dyn Model = &network;

        assert_eq!(model.input_shapes(), vec![vec![2]]);
        assert_eq!(model.num_outputs(), 1);
        assert_eq!(model.forward(&[1.0, 1.0])?, vec![1.5]);
        assert_eq!(model.backward(&[1.0, 1.0], &[1.0])?, vec![2.0, -1.0]);
        Ok(())
    }

    #[test]
    fn test_fn_model_is_not_differentiable() -> Result<(), NnError> {
        let model = FnModel::new([3], |x| vec![x.iter().sum()]);

        assert_eq!(model.forward(&[1.0, 2.0, 3.0])?, vec![6.0]);
        assert_eq!(
            model.backward(&[1.0, 2.0, 3.0], &[1.0]),
            Err(NnError::NotDifferentiable("model".to_string()))
        );
        assert!(matches!(
            model.forward(&[1.0]),
            Err(NnError::DataLength { .. })
        ));
        Ok(())
    }
}
