#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use nnviz_image as image;

#[doc(inline)]
pub use nnviz_imgproc as imgproc;

#[doc(inline)]
pub use nnviz_nn as nn;

#[doc(inline)]
pub use nnviz_plots as plots;
