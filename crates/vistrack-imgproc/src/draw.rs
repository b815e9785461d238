use vistrack_image::Image;

/// Write `color` at `(x, y)`, ignoring coordinates outside the image.
#[inline]
fn set_pixel<T: Copy, const C: usize>(img: &mut Image<T, C>, x: i64, y: i64, color: [T; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. Values above 1 stamp a square brush.
pub fn draw_line<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [T; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let half = if thickness > 1 { thickness as i64 / 2 } else { 0 };

    loop {
        for i in -half..=half {
            for j in -half..=half {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a rectangle border on an image inplace.
///
/// The border grows inwards from the outer edge. Rings are drawn while they
/// still fit inside the rectangle, so a small box is never filled solid.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `size` - The outer width and height of the rectangle.
/// * `color` - The color of the border.
/// * `thickness` - The number of rings in the border.
pub fn draw_rect<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    top_left: (i64, i64),
    size: (usize, usize),
    color: [T; C],
    thickness: usize,
) {
    let (x, y) = top_left;
    let (w, h) = (size.0 as i64, size.1 as i64);

    let mut t = 0i64;
    while (t as usize) < thickness && t < w / 2 && t < h / 2 {
        let (left, right) = (x + t, x + w - 1 - t);
        let (top, bottom) = (y + t, y + h - 1 - t);
        for i in left..=right {
            set_pixel(img, i, top, color);
            set_pixel(img, i, bottom, color);
        }
        for j in top..=bottom {
            set_pixel(img, left, j, color);
            set_pixel(img, right, j, color);
        }
        t += 1;
    }
}

/// Draws a `+` marker with arms of `arm` pixels around `center`.
pub fn draw_cross<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    center: (i64, i64),
    arm: i64,
    color: [T; C],
) {
    let (cx, cy) = center;
    for d in -arm..=arm {
        set_pixel(img, cx + d, cy, color);
        set_pixel(img, cx, cy + d, color);
    }
}

/// Fills every pixel whose distance to `center` is at most `radius`.
///
/// The center may lie between pixels; distances are measured from it
/// exactly rather than from the nearest pixel.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The disc center (x, y).
/// * `radius` - The disc radius in pixels.
/// * `color` - The fill color.
pub fn draw_filled_circle<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    center: (f32, f32),
    radius: f32,
    color: [T; C],
) {
    let (cx, cy) = center;
    let r2 = radius * radius;

    let y_min = ((cy - radius).floor() as i64).max(0);
    let y_max = ((cy + radius).ceil() as i64).min(img.rows() as i64 - 1);
    let x_min = ((cx - radius).floor() as i64).max(0);
    let x_max = ((cx + radius).ceil() as i64).min(img.cols() as i64 - 1);

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, x, y, color);
            }
        }
    }
}
