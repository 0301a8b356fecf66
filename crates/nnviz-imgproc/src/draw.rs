use nnviz_image::Image;

/// Draws a filled rectangle on an image inplace.
///
/// The rectangle covers `[top_left, bottom_right)`; the parts outside of the
/// image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The exclusive bottom-right corner coordinates (x, y).
/// * `color` - The fill color of the rectangle.
pub fn draw_filled_rect<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [T; C],
) {
    let (x_start, y_start) = top_left;
    let (x_end, y_end) = bottom_right;

    let x_min = x_start.min(x_end).max(0);
    let y_min = y_start.min(y_end).max(0);
    let x_max = x_start.max(x_end).min(img.cols() as i64);
    let y_max = y_start.max(y_end).min(img.rows() as i64);

    if x_min >= x_max || y_min >= y_max {
        return;
    }

    let cols = img.cols();
    let data = img.as_slice_mut();
    for y in y_min as usize..y_max as usize {
        let row = &mut data[y * cols * C..(y + 1) * cols * C];
        for pixel in row[x_min as usize * C..x_max as usize * C].chunks_exact_mut(C) {
            pixel.copy_from_slice(&color);
        }
    }
}
