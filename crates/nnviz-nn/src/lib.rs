#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # nnviz Neural Network Operations
//!
//! Small layers that run one sample at a time and expose the vector-Jacobian
//! product of every operation, which is all that gradient based plots need.
//!
//! ## Example: input gradient of a linear model
//!
//! ```rust
//! use nnviz_nn::{linear::Linear, network::Sequential, reshape::Reshape};
//!
//! let network = Sequential::new([2, 2, 1])
//!     .push(Reshape::flatten())?
//!     .push(Linear::new(vec![0.1, -0.2, 0.3, -0.4], vec![0.0], 4, 1)?)?;
//!
//! let grad = network.backward(&[0.0; 4], &[1.0])?;
//! assert_eq!(grad.len(), 4);
//! # Ok::<(), nnviz_nn::NnError>(())
//! ```

/// Element-wise and normalizing activation layers.
pub mod activation;

/// 2D convolution layer.
pub mod conv;

/// Error types for the neural network module.
pub mod error;

/// The layer trait.
pub mod layer;

/// Linear (fully-connected) layer operations.
///
/// Implements matrix multiplication-based linear transformations with bias and
/// their input gradient.
pub mod linear;

/// Model trait consumed by attribution methods.
pub mod model;

/// Layer containers.
pub mod network;

/// Shape manipulation and closure layers.
pub mod reshape;

pub use crate::error::NnError;
pub use crate::layer::Layer;
pub use crate::model::{FnModel, Model};
pub use crate::network::{GraphNode, LayerGraph, MultiHead, Sequential};
