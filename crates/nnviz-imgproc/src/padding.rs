/// A border type used by filters to read pixels outside of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    /// This border type fills the border with a single, constant value of zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Constant,

    /// This border type takes the outermost row or column of pixels and repeats it into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// This border type reflects the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,

    /// This border type reflects the pixel values at the boundary, starting with the edge pixel itself.
    ///
    /// Example: ...d c b a | a b c d...
    #[default]
    Reflect,

    /// This border type wraps the content from the opposite side to fill the border.
    ///
    /// Example: ...d c b a | w x y z...
    Wrap,
}

impl PaddingMode {
    #[inline]
    fn reflect(i: isize, len: usize) -> usize {
        let len = len as isize;
        let m = i.rem_euclid(2 * len);
        if m < len {
            m as usize
        } else {
            (2 * len - 1 - m) as usize
        }
    }

    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let m = i.rem_euclid(2 * len - 2);
        if m < len {
            m as usize
        } else {
            (2 * len - 2 - m) as usize
        }
    }

    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        ((i % len as isize + len as isize) % len as isize) as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the padding mode.
    ///
    /// Returns `None` for [`PaddingMode::Constant`] when `i` falls outside the
    /// image, meaning the sample contributes zero.
    ///
    /// PRECONDITION: `len > 0`.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            PaddingMode::Constant => None,
            PaddingMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            PaddingMode::Reflect => Some(Self::reflect(i, len)),
            PaddingMode::Reflect101 => Some(Self::reflect101(i, len)),
            PaddingMode::Wrap => Some(Self::wrap(i, len)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaddingMode;

    #[test]
    fn map_index_modes() {
        // image: a b c d
        let len = 4;
        assert_eq!(PaddingMode::Constant.map_index(-1, len), None);
        assert_eq!(PaddingMode::Constant.map_index(2, len), Some(2));
        assert_eq!(PaddingMode::Replicate.map_index(-3, len), Some(0));
        assert_eq!(PaddingMode::Replicate.map_index(6, len), Some(3));
        assert_eq!(PaddingMode::Reflect.map_index(-1, len), Some(0));
        assert_eq!(PaddingMode::Reflect.map_index(-2, len), Some(1));
        assert_eq!(PaddingMode::Reflect.map_index(4, len), Some(3));
        assert_eq!(PaddingMode::Reflect101.map_index(-1, len), Some(1));
        assert_eq!(PaddingMode::Reflect101.map_index(4, len), Some(2));
        assert_eq!(PaddingMode::Wrap.map_index(-1, len), Some(3));
        assert_eq!(PaddingMode::Wrap.map_index(5, len), Some(1));
    }

    #[test]
    fn map_index_large_offsets() {
        // kernels wider than the image bounce back and forth
        assert_eq!(PaddingMode::Reflect.map_index(-9, 3), Some(2));
        assert_eq!(PaddingMode::Reflect.map_index(7, 3), Some(1));
        assert_eq!(PaddingMode::Reflect.map_index(5, 1), Some(0));
        assert_eq!(PaddingMode::Reflect101.map_index(-7, 3), Some(1));
        assert_eq!(PaddingMode::Reflect101.map_index(6, 3), Some(2));
        assert_eq!(PaddingMode::Reflect101.map_index(3, 1), Some(0));
    }

    #[test]
    fn map_index_far_offsets() {
        // one period of reflect on 4 pixels is 8 samples
        let far = 8 * 100_000_000;
        assert_eq!(PaddingMode::Reflect.map_index(far, 4), Some(0));
        assert_eq!(PaddingMode::Reflect.map_index(far + 5, 4), Some(2));
        assert_eq!(PaddingMode::Reflect.map_index(-far - 1, 4), Some(0));
        assert_eq!(PaddingMode::Reflect101.map_index(6 * 100_000_000 + 4, 4), Some(2));
        assert_eq!(PaddingMode::Wrap.map_index(-far - 1, 4), Some(3));
    }
}
