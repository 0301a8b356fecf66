use rayon::prelude::*;
use thiserror::Error;

use nnviz_image::Image;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how row based operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelElements,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when results must not depend on
    /// the thread pool.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Run `op` once per row of `dst`, where a row holds `row_len` elements.
    ///
    /// The closure receives the row index and the mutable row slice.
    pub fn for_each_row<T, F>(
        &self,
        dst: &mut [T],
        row_len: usize,
        op: F,
    ) -> Result<(), ParallelError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if row_len == 0 {
            return Ok(());
        }

        match self {
            ExecutionStrategy::Serial => {
                dst.chunks_mut(row_len)
                    .enumerate()
                    .for_each(|(r, row)| op(r, row));
            }
            ExecutionStrategy::ParallelElements => {
                dst.par_chunks_mut(row_len)
                    .enumerate()
                    .for_each(|(r, row)| op(r, row));
            }
            ExecutionStrategy::Fixed(n) => {
                if *n == 0 {
                    return Err(ParallelError::InvalidThreadCount(*n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;

                pool.install(|| {
                    dst.par_chunks_mut(row_len)
                        .enumerate()
                        .for_each(|(r, row)| op(r, row));
                });
            }
        }

        Ok(())
    }
}

/// Apply a function to each pixel in the image in parallel.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each pixel in the image in parallel with two values.
pub fn par_iter_rows_val_two<T1, const C1: usize, T2, const C2: usize, T3, const C3: usize>(
    src1: &Image<T1, C1>,
    src2: &Image<T2, C2>,
    dst: &mut Image<T3, C3>,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
    T3: Clone + Send + Sync,
{
    let cols = src1.cols();
    if cols == 0 {
        return;
    }

    src1.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(src2.as_slice().par_chunks_exact(C2 * cols))
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C3 * cols))
        .for_each(|((src1_chunk, src2_chunk), dst_chunk)| {
            src1_chunk
                .iter()
                .zip(src2_chunk.iter())
                .zip(dst_chunk.iter_mut())
                .for_each(|((src1_pixel, src2_pixel), dst_pixel)| {
                    f(src1_pixel, src2_pixel, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_row_serial() {
        let mut dst = vec![0; 6];
        ExecutionStrategy::Serial
            .for_each_row(&mut dst, 3, |r, row| row.iter_mut().for_each(|v| *v = r))
            .unwrap();
        assert_eq!(dst, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_for_each_row_parallel() {
        let mut dst = vec![0; 6];
        ExecutionStrategy::ParallelElements
            .for_each_row(&mut dst, 2, |r, row| row.iter_mut().for_each(|v| *v = r))
            .unwrap();
        assert_eq!(dst, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_for_each_row_fixed() {
        let mut dst = vec![0; 4];
        ExecutionStrategy::Fixed(2)
            .for_each_row(&mut dst, 1, |r, row| row[0] = r * 2)
            .unwrap();
        assert_eq!(dst, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_for_each_row_fixed_error() {
        let mut dst = vec![0; 4];
        let res = ExecutionStrategy::Fixed(0).for_each_row(&mut dst, 1, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }
}
