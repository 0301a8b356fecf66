#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// colormaps to render heatmaps.
pub mod colormap;

/// utilities to draw on images.
pub mod draw;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// operations to normalize images.
pub mod normalize;

/// border handling for filters.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;
