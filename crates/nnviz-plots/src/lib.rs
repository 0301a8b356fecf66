#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # nnviz Plots
//!
//! Visual diagnostics for the networks of `nnviz-nn`.
//!
//! - [`saliency`]: gradient based saliency maps and their overlay on the input image.
//! - [`hinton`]: Hinton diagrams of weight matrices.
//! - [`structure`]: graphviz descriptions of the network connectivity.

/// Plot parameters.
pub mod config;

/// Error types for the plots module.
pub mod error;

/// Hinton diagrams.
pub mod hinton;

/// Saliency maps.
pub mod saliency;

/// Network structure graphs in the DOT language.
pub mod structure;

pub use crate::config::{ChannelReduction, HintonConfig, SaliencyConfig, SaliencyMode};
pub use crate::error::PlotError;
pub use crate::saliency::{compute_saliency, compute_saliency_with_config, SaliencyMap};
