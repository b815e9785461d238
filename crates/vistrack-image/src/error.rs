use crate::frame::PixelFormat;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the image sizes do not match.
    #[error("Image size mismatch: ({0}x{1}) vs ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when an argument is out of its valid domain, e.g. a zero-sized image.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error when the frame encoding is not the one the operation expects.
    #[error("Unsupported pixel format: expected {expected}, found {found}")]
    UnsupportedFormat {
        /// The pixel format the operation requires.
        expected: PixelFormat,
        /// The pixel format of the frame that was passed in.
        found: PixelFormat,
    },

    /// Error when a buffer of the given number of elements could not be allocated.
    #[error("Failed to allocate a buffer of {0} elements")]
    OutOfMemory(usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),
}
