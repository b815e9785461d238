use vistrack_image::{Frame, GrayImage, ImageError, Rgb565Image};

/// Define the RGB weights for the grayscale conversion.
const RW: f32 = 0.299;
const GW: f32 = 0.587;
const BW: f32 = 0.114;

/// Packed 5-6-5 white.
pub const RGB565_WHITE: u16 = 0xFFFF;
/// Packed 5-6-5 black.
pub const RGB565_BLACK: u16 = 0x0000;
/// Packed 5-6-5 red.
pub const RGB565_RED: u16 = 0xF800;
/// Packed 5-6-5 green.
pub const RGB565_GREEN: u16 = 0x07E0;
/// Packed 5-6-5 blue.
pub const RGB565_BLUE: u16 = 0x001F;

/// Expand a packed 5-6-5 sample to 8-bit red, green and blue.
///
/// The high 5 bits become red shifted left by 3, the middle 6 bits green shifted
/// left by 2 and the low 5 bits blue shifted left by 3.
///
/// # Examples
///
/// ```
/// use vistrack_imgproc::color::rgb_from_rgb565;
///
/// assert_eq!(rgb_from_rgb565(0xFFFF), [248, 252, 248]);
/// assert_eq!(rgb_from_rgb565(0x0000), [0, 0, 0]);
/// ```
#[inline]
pub fn rgb_from_rgb565(sample: u16) -> [u8; 3] {
    let r = ((sample >> 11) << 3) as u8;
    let g = (((sample >> 5) & 0x3F) << 2) as u8;
    let b = ((sample & 0x1F) << 3) as u8;
    [r, g, b]
}

/// Pack 8-bit red, green and blue into a 5-6-5 sample, dropping the low bits.
#[inline]
pub fn rgb565_from_rgb(rgb: [u8; 3]) -> u16 {
    let [r, g, b] = rgb;
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Compute the luma of an 8-bit RGB triplet using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// The result is truncated towards zero.
#[inline]
pub fn gray_from_rgb(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb;
    (RW * r as f32 + GW * g as f32 + BW * b as f32) as u8
}

/// Convert a packed 5-6-5 image to 8-bit grayscale.
///
/// # Arguments
///
/// * `src` - The input RGB565 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use vistrack_image::{GrayImage, Rgb565Image, ImageSize};
/// use vistrack_imgproc::color::gray_from_rgb565;
///
/// let image = Rgb565Image::new(ImageSize { width: 2, height: 1 }, vec![0xFFFF, 0]).unwrap();
/// let mut gray = GrayImage::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb565(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[250, 0]);
/// ```
pub fn gray_from_rgb565(src: &Rgb565Image, dst: &mut GrayImage) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    src.as_slice()
        .iter()
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(&sample, gray)| {
            *gray = gray_from_rgb(rgb_from_rgb565(sample));
        });

    Ok(())
}

/// Write the grayscale version of a frame into `dst`.
///
/// RGB565 frames are converted, GRAY8 frames are copied as they are.
pub fn gray_from_frame(src: &Frame, dst: &mut GrayImage) -> Result<(), ImageError> {
    match src {
        Frame::Rgb565(img) => gray_from_rgb565(img, dst),
        Frame::Gray8(img) => {
            if img.size() != dst.size() {
                return Err(ImageError::InvalidImageSize(
                    img.cols(),
                    img.rows(),
                    dst.cols(),
                    dst.rows(),
                ));
            }
            dst.as_slice_mut().copy_from_slice(img.as_slice());
            Ok(())
        }
    }
}
