use crate::{
    error::{check_len, num_elements, NnError},
    layer::Layer,
};

/// A layer of a network graph, as seen by structure plots.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Unique name of the layer inside its container.
    pub name: String,
    /// Shape produced by the layer.
    pub output_shape: Vec<usize>,
}

/// Read-only view of a network's connectivity.
pub trait LayerGraph {
    /// Layers in topological order; the first node is the input layer.
    fn nodes(&self) -> Vec<GraphNode>;

    /// Directed connections between indices of [`LayerGraph::nodes`].
    fn edges(&self) -> Vec<(usize, usize)>;
}

/// A chain of layers applied one after the other.
///
/// # Example
///
/// ```
/// use nnviz_nn::{activation::Relu, linear::Linear, network::Sequential, reshape::Reshape};
///
/// let network = Sequential::new([2, 2, 1])
///     .push(Reshape::flatten())?
///     .push(Linear::new(vec![1.0; 4], vec![0.0], 4, 1)?)?
///     .push(Relu::new())?;
///
/// assert_eq!(network.output_shape(), &[1]);
/// assert_eq!(network.forward(&[1.0, 2.0, 3.0, -10.0])?, vec![0.0]);
/// # Ok::<(), nnviz_nn::NnError>(())
/// ```
pub struct Sequential {
    input_shape: Vec<usize>,
    layers: Vec<Box<dyn Layer>>,
    names: Vec<String>,
    // output shape of every layer
    shapes: Vec<Vec<usize>>,
}

impl Sequential {
    /// Create an empty network accepting inputs of `input_shape`.
    pub fn new(input_shape: impl Into<Vec<usize>>) -> Self {
        Self {
            input_shape: input_shape.into(),
            layers: Vec::new(),
            names: Vec::new(),
            shapes: Vec::new(),
        }
    }

    /// Append `layer` to the network.
    ///
    /// Unnamed layers are called `"{kind}-{n}"`, numbering each kind from one.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::IncompatibleLayer`] if the layer cannot accept the current output
    /// shape and [`NnError::DuplicateLayerName`] if its name is already taken.
    pub fn push(mut self, layer: impl Layer + 'static) -> Result<Self, NnError> {
        let name = match layer.name() {
            Some(name) => name.to_string(),
            None => {
                let n = self.layers.iter().filter(|l| l.kind() == layer.kind()).count();
                format!("{}-{}", layer.kind(), n + 1)
            }
        };
        if name == "input" || self.names.contains(&name) {
            return Err(NnError::DuplicateLayerName(name));
        }

        let shape = layer
            .output_shape(self.output_shape())
            .map_err(|e| match e {
                NnError::IncompatibleLayer { reason, .. } => NnError::IncompatibleLayer {
                    layer: name.clone(),
                    reason,
                },
                e => e,
            })?;

        log::trace!("connect {name}: {:?} -> {shape:?}", self.output_shape());

        self.layers.push(Box::new(layer));
        self.names.push(name);
        self.shapes.push(shape);
        Ok(self)
    }

    /// Shape of a single input sample.
    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    /// Shape of the network output.
    pub fn output_shape(&self) -> &[usize] {
        self.shapes.last().unwrap_or(&self.input_shape)
    }

    /// Number of layers, the input excluded.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the network has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Names of the layers in order.
    pub fn layer_names(&self) -> &[String] {
        &self.names
    }

    /// Output shape of every layer in order.
    pub fn output_shapes_per_layer(&self) -> &[Vec<usize>] {
        &self.shapes
    }

    fn input_shape_of(&self, index: usize) -> &[usize] {
        match index {
            0 => &self.input_shape,
            i => &self.shapes[i - 1],
        }
    }

    // activations[0] is the input, activations[i + 1] the output of layer i
    fn forward_cached(&self, input: &[f32]) -> Result<Vec<Vec<f32>>, NnError> {
        check_len(input, &self.input_shape)?;

        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.to_vec());
        for (i, layer) in self.layers.iter().enumerate() {
            let x = &activations[i];
            let y = layer.forward(x, self.input_shape_of(i))?;
            check_len(&y, &self.shapes[i])?;
            activations.push(y);
        }
        Ok(activations)
    }

    /// Propagate one sample through the network.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError> {
        let mut activations = self.forward_cached(input)?;
        Ok(activations.pop().unwrap_or_default())
    }

    /// Gradient of `dot(grad_output, forward(input))` with respect to `input`.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::NotDifferentiable`] naming the first layer, walking from the
    /// output, that has no gradient.
    pub fn backward(&self, input: &[f32], grad_output: &[f32]) -> Result<Vec<f32>, NnError> {
        let activations = self.forward_cached(input)?;
        check_len(grad_output, self.output_shape())?;

        let mut grad = grad_output.to_vec();
        for (i, layer) in self.layers.iter().enumerate().rev() {
            grad = layer
                .backward(
                    &activations[i],
                    self.input_shape_of(i),
                    &activations[i + 1],
                    &grad,
                )
                .map_err(|e| match e {
                    NnError::NotDifferentiable(_) => {
                        NnError::NotDifferentiable(self.names[i].clone())
                    }
                    e => e,
                })?;
            log::trace!("backward {}: {} values", self.names[i], grad.len());
        }
        Ok(grad)
    }
}

impl LayerGraph for Sequential {
    fn nodes(&self) -> Vec<GraphNode> {
        std::iter::once(GraphNode {
            name: "input".to_string(),
            output_shape: self.input_shape.clone(),
        })
        .chain(
            self.names
                .iter()
                .zip(self.shapes.iter())
                .map(|(name, shape)| GraphNode {
                    name: name.clone(),
                    output_shape: shape.clone(),
                }),
        )
        .collect()
    }

    fn edges(&self) -> Vec<(usize, usize)> {
        (0..self.layers.len()).map(|i| (i, i + 1)).collect()
    }
}

/// Several output heads sharing one trunk.
pub struct MultiHead {
    trunk: Sequential,
    heads: Vec<Sequential>,
}

impl MultiHead {
    /// Connect every head to the output of `trunk`.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::EmptyNetwork`] without heads and [`NnError::IncompatibleLayer`]
    /// when a head is empty or does not accept the trunk output shape.
    pub fn new(trunk: Sequential, heads: Vec<Sequential>) -> Result<Self, NnError> {
        if heads.is_empty() {
            return Err(NnError::EmptyNetwork("output heads"));
        }

        for (k, head) in heads.iter().enumerate() {
            if head.is_empty() {
                return Err(NnError::IncompatibleLayer {
                    layer: format!("head-{}", k + 1),
                    reason: "head has no layers".to_string(),
                });
            }
            if head.input_shape() != trunk.output_shape() {
                return Err(NnError::IncompatibleLayer {
                    layer: format!("head-{}", k + 1),
                    reason: format!(
                        "expects input of shape {:?}, trunk produces {:?}",
                        head.input_shape(),
                        trunk.output_shape()
                    ),
                });
            }
        }

        Ok(Self { trunk, heads })
    }

    /// The shared trunk.
    pub fn trunk(&self) -> &Sequential {
        &self.trunk
    }

    /// The output heads.
    pub fn heads(&self) -> &[Sequential] {
        &self.heads
    }

    /// Propagate one sample and concatenate the outputs of all heads.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NnError> {
        let features = self.trunk.forward(input)?;
        let mut output = Vec::new();
        for head in &self.heads {
            output.extend(head.forward(&features)?);
        }
        Ok(output)
    }

    /// Gradient of `dot(grad_output, forward(input))` with respect to `input`.
    ///
    /// `grad_output` is laid out like the concatenated output of [`MultiHead::forward`].
    pub fn backward(&self, input: &[f32], grad_output: &[f32]) -> Result<Vec<f32>, NnError> {
        let total = self
            .heads
            .iter()
            .map(|h| num_elements(h.output_shape()))
            .sum::<usize>();
        if grad_output.len() != total {
            return Err(NnError::DataLength {
                shape: vec![total],
                expected: total,
                actual: grad_output.len(),
            });
        }

        let features = self.trunk.forward(input)?;
        let mut grad_features = vec![0.0; features.len()];
        let mut offset = 0;
        for head in &self.heads {
            let n = num_elements(head.output_shape());
            let grad = head.backward(&features, &grad_output[offset..offset + n])?;
            grad_features
                .iter_mut()
                .zip(grad.iter())
                .for_each(|(acc, g)| *acc += g);
            offset += n;
        }

        self.trunk.backward(input, &grad_features)
    }
}

impl LayerGraph for MultiHead {
    fn nodes(&self) -> Vec<GraphNode> {
        let mut nodes = self.trunk.nodes();
        for head in &self.heads {
            // skip the implicit input of the head, it is the trunk output
            nodes.extend(head.nodes().into_iter().skip(1));
        }
        nodes
    }

    fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = self.trunk.edges();
        let trunk_output = self.trunk.len();
        let mut offset = trunk_output + 1;
        for head in &self.heads {
            edges.push((trunk_output, offset));
            for i in 0..head.len() - 1 {
                edges.push((offset + i, offset + i + 1));
            }
            offset += head.len();
        }
        edges
    }
}
