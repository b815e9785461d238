use vistrack_image::{GrayImage, Image, ImageError};

use crate::schedule::{yield_on_row, CooperativeYield};

/// Overwrite every pixel of `dst` where the mask is non-zero with `value`.
///
/// The mask is a binary image where the value 0 is considered as False
/// and any other value is considered as True. Applying the same mask and
/// value twice leaves the image unchanged the second time.
///
/// # Arguments
///
/// * `dst` - The image to modify in place.
/// * `mask` - The binary mask selecting the pixels to overwrite.
/// * `value` - The replacement pixel.
/// * `every_rows` - Call `yielder` after each row divisible by this value. Zero disables it.
/// * `yielder` - The cooperative yield hook.
///
/// # Returns
///
/// The number of pixels selected by the mask.
///
/// # Example
///
/// ```
/// use vistrack_image::{GrayImage, Image, ImageSize};
/// use vistrack_imgproc::core::replace_masked;
/// use vistrack_imgproc::schedule::NoYield;
///
/// let size = ImageSize { width: 2, height: 2 };
/// let mut image = Image::<u16, 1>::new(size, vec![1, 2, 3, 4]).unwrap();
/// let mask = GrayImage::new(size, vec![255, 0, 0, 1]).unwrap();
///
/// let n = replace_masked(&mut image, &mask, [0xFFFF], 0, &mut NoYield).unwrap();
///
/// assert_eq!(n, 2);
/// assert_eq!(image.as_slice(), &[0xFFFF, 2, 3, 0xFFFF]);
/// ```
pub fn replace_masked<T: Copy, const C: usize, Y: CooperativeYield + ?Sized>(
    dst: &mut Image<T, C>,
    mask: &GrayImage,
    value: [T; C],
    every_rows: usize,
    yielder: &mut Y,
) -> Result<usize, ImageError> {
    if dst.size() != mask.size() {
        return Err(ImageError::InvalidImageSize(
            dst.cols(),
            dst.rows(),
            mask.cols(),
            mask.rows(),
        ));
    }

    let cols = dst.cols();
    let mut replaced = 0;

    for (y, (dst_row, mask_row)) in dst
        .as_slice_mut()
        .chunks_exact_mut(cols * C)
        .zip(mask.as_slice().chunks_exact(cols))
        .enumerate()
    {
        for (pixel, &m) in dst_row.chunks_exact_mut(C).zip(mask_row.iter()) {
            if m != 0 {
                pixel.copy_from_slice(&value);
                replaced += 1;
            }
        }
        yield_on_row(y, every_rows, yielder);
    }

    Ok(replaced)
}
