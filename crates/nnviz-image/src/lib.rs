#![deny(missing_docs)]
//! Image types shared by the nnviz plotting crates

/// image representation for plotting and model inputs.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};

impl<T, const CHANNELS: usize> TryFrom<ndarray::ArrayD<T>> for Image<T, CHANNELS>
where
    T: Clone,
{
    type Error = ImageError;

    fn try_from(array: ndarray::ArrayD<T>) -> Result<Image<T, CHANNELS>, ImageError> {
        let shape = array.shape().to_vec();
        if shape.len() != 3 {
            return Err(ImageError::InvalidImageDimensions(shape.len()));
        }

        let (height, width, channels) = (shape[0], shape[1], shape[2]);
        if channels != CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                height * width * channels,
                height * width * CHANNELS,
            ));
        }

        // iterate in logical order so non standard layouts are copied correctly
        let data = array.iter().cloned().collect();

        Self::new(ImageSize { height, width }, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_from_ndarray() -> Result<(), ImageError> {
        let array = ndarray::Array3::<f32>::from_shape_fn((2, 3, 1), |(y, x, _)| {
            (y * 3 + x) as f32
        })
        .into_dyn();

        let image = Image::<f32, 1>::try_from(array)?;
        assert_eq!(image.size(), ImageSize { width: 3, height: 2 });
        assert_eq!(image.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        Ok(())
    }

    #[test]
    fn image_from_2d_ndarray() {
        let array = ndarray::Array2::<f32>::ones((28, 28)).into_dyn();
        let res = Image::<f32, 3>::try_from(array);
        assert_eq!(res, Err(ImageError::InvalidImageDimensions(2)));
        assert_eq!(
            ImageError::InvalidImageDimensions(2).to_string(),
            "Invalid image shape. Image expected to be 3D, got 2D image"
        );
    }

    #[test]
    fn image_from_ndarray_wrong_channels() {
        let array = ndarray::Array3::<f32>::ones((2, 2, 3)).into_dyn();
        let res = Image::<f32, 1>::try_from(array);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(12, 4)));
    }
}
