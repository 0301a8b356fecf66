/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the image data is empty.
    #[error("Image data is not initialized")]
    ImageDataNotInitialized,

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the array to convert is not a (height, width, channels) array.
    #[error("Invalid image shape. Image expected to be 3D, got {0}D image")]
    InvalidImageDimensions(usize),

    /// Error when two images are expected to have the same size.
    #[error("Image size mismatch: got {0}x{1}, expected {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the number of channels is not supported by an operation.
    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(usize),

    /// Error when a filter kernel cannot be centered on a pixel.
    #[error("Kernel length must be odd and non-zero, got {0}")]
    InvalidKernelLength(usize),

    /// Error when the standard deviation of a gaussian kernel is not usable.
    #[error("Gaussian sigma must be positive and finite, got {0}")]
    InvalidSigma(f32),

    /// Error raised by the execution backend of a parallel operation.
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}
