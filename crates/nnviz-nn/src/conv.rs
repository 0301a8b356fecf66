use crate::{
    error::{check_len, NnError},
    layer::Layer,
};

/// 2D convolution over (height, width, channels) inputs.
///
/// Valid padding and unit stride: an `[H, W, CIN]` input yields an
/// `[H - KH + 1, W - KW + 1, COUT]` output.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2d {
    // [KH, KW, CIN, COUT] row-major
    kernel: Vec<f32>,
    bias: Vec<f32>,
    kernel_size: (usize, usize),
    in_channels: usize,
    out_channels: usize,
    name: Option<String>,
}

impl Conv2d {
    /// Create a convolution from a `[KH, KW, CIN, COUT]` kernel and a `[COUT]` bias.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::InvalidParameter`] for empty kernels or mismatched parameter lengths.
    pub fn new(
        kernel: Vec<f32>,
        bias: Vec<f32>,
        kernel_size: (usize, usize),
        in_channels: usize,
        out_channels: usize,
    ) -> Result<Self, NnError> {
        let (kh, kw) = kernel_size;
        if kh == 0 || kw == 0 || in_channels == 0 || out_channels == 0 {
            return Err(NnError::InvalidParameter(format!(
                "convolution kernel ({kh}, {kw}, {in_channels}, {out_channels}) has an empty dimension"
            )));
        }
        if kernel.len() != kh * kw * in_channels * out_channels {
            return Err(NnError::InvalidParameter(format!(
                "convolution kernel has {} values, expected {kh}x{kw}x{in_channels}x{out_channels}",
                kernel.len()
            )));
        }
        if bias.len() != out_channels {
            return Err(NnError::InvalidParameter(format!(
                "convolution bias has {} values, expected {out_channels}",
                bias.len()
            )));
        }

        Ok(Self {
            kernel,
            bias,
            kernel_size,
            in_channels,
            out_channels,
            name: None,
        })
    }

    /// Set the name of the layer.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    fn kernel_index(&self, ky: usize, kx: usize, ci: usize, co: usize) -> usize {
        ((ky * self.kernel_size.1 + kx) * self.in_channels + ci) * self.out_channels + co
    }

    fn dims(&self, input_shape: &[usize]) -> Result<(usize, usize, usize, usize), NnError> {
        let incompatible = |reason: String| NnError::IncompatibleLayer {
            layer: self.name().unwrap_or(self.kind()).to_string(),
            reason,
        };

        let [h, w, c] = input_shape else {
            return Err(incompatible(format!(
                "expects (height, width, channels) input, got {input_shape:?}"
            )));
        };
        if *c != self.in_channels {
            return Err(incompatible(format!(
                "expects {} input channels, got {c}",
                self.in_channels
            )));
        }

        let (kh, kw) = self.kernel_size;
        if *h < kh || *w < kw {
            return Err(incompatible(format!(
                "kernel ({kh}, {kw}) does not fit an input of size ({h}, {w})"
            )));
        }

        Ok((*h, *w, h - kh + 1, w - kw + 1))
    }
}

impl Layer for Conv2d {
    fn kind(&self) -> &'static str {
        "conv"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, NnError> {
        let (_, _, oh, ow) = self.dims(input_shape)?;
        Ok(vec![oh, ow, self.out_channels])
    }

    fn forward(&self, input: &[f32], input_shape: &[usize]) -> Result<Vec<f32>, NnError> {
        let (_, w, oh, ow) = self.dims(input_shape)?;
        check_len(input, input_shape)?;

        let (kh, kw) = self.kernel_size;
        let (cin, cout) = (self.in_channels, self.out_channels);

        let mut output = Vec::with_capacity(oh * ow * cout);
        for oy in 0..oh {
            for ox in 0..ow {
                let mut acc = self.bias.clone();
                for ky in 0..kh {
                    for kx in 0..kw {
                        let pixel = &input[((oy + ky) * w + ox + kx) * cin..][..cin];
                        for (ci, &x) in pixel.iter().enumerate() {
                            let k = &self.kernel[self.kernel_index(ky, kx, ci, 0)..][..cout];
                            for (a, &kv) in acc.iter_mut().zip(k.iter()) {
                                *a += x * kv;
                            }
                        }
                    }
                }
                output.extend_from_slice(&acc);
            }
        }

        Ok(output)
    }

    fn backward(
        &self,
        _input: &[f32],
        input_shape: &[usize],
        _output: &[f32],
        grad_output: &[f32],
    ) -> Result<Vec<f32>, NnError> {
        let (h, w, oh, ow) = self.dims(input_shape)?;
        let (kh, kw) = self.kernel_size;
        let (cin, cout) = (self.in_channels, self.out_channels);
        check_len(grad_output, &[oh, ow, cout])?;

        let mut grad_input = vec![0.0; h * w * cin];
        for oy in 0..oh {
            for ox in 0..ow {
                let g = &grad_output[(oy * ow + ox) * cout..][..cout];
                for ky in 0..kh {
                    for kx in 0..kw {
                        let base = ((oy + ky) * w + ox + kx) * cin;
                        for ci in 0..cin {
                            let k = &self.kernel[self.kernel_index(ky, kx, ci, 0)..][..cout];
                            let dot: f32 = g.iter().zip(k.iter()).map(|(g, k)| g * k).sum();
                            grad_input[base + ci] += dot;
                        }
                    }
                }
            }
        }

        Ok(grad_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv2d_output_shape() -> Result<(), NnError> {
        let conv = Conv2d::new(vec![0.0; 3 * 3 * 3 * 8], vec![0.0; 8], (3, 3), 3, 8)?;
        assert_eq!(conv.output_shape(&[28, 28, 3])?, vec![26, 26, 8]);
        assert!(matches!(
            conv.output_shape(&[28, 28, 1]),
            Err(NnError::IncompatibleLayer { .. })
        ));
        assert!(matches!(
            conv.output_shape(&[784]),
            Err(NnError::IncompatibleLayer { .. })
        ));
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_conv2d_forward() -> Result<(), NnError> {
        // 2x2 box kernel, one channel in, one out
        let conv = Conv2d::new(vec![1.0; 4], vec![0.5], (2, 2), 1, 1)?;
        let input = [
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        ];
        let output = conv.forward(&input, &[3, 3, 1])?;
        assert_eq!(output, vec![12.5, 16.5, 24.5, 28.5]);
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_conv2d_backward() -> Result<(), NnError> {
        let conv = Conv2d::new(vec![1.0, 2.0, 3.0, 4.0], vec![0.0], (2, 2), 1, 1)?;
        let input = [0.0; 9];
        let output = conv.forward(&input, &[3, 3, 1])?;

        // gradient flowing from the top-left output only
        let grad = conv.backward(&input, &[3, 3, 1], &output, &[1.0, 0.0, 0.0, 0.0])?;
        assert_eq!(grad, vec![
            1.0, 2.0, 0.0,
            3.0, 4.0, 0.0,
            0.0, 0.0, 0.0,
        ]);

        // every output contributes
        let grad = conv.backward(&input, &[3, 3, 1], &output, &[1.0; 4])?;
        assert_eq!(grad, vec![
            1.0, 3.0, 2.0,
            4.0, 10.0, 6.0,
            3.0, 7.0, 4.0,
        ]);
        Ok(())
    }
}
