use crate::error::ImageError;

/// Allocate a vector of `len` elements filled with `val`, reporting allocation failure.
///
/// Frame-sized scratch buffers (gradients, masks, tracker planes) go through this
/// helper so a transient heap exhaustion surfaces as [`ImageError::OutOfMemory`]
/// instead of aborting the process.
///
/// # Arguments
///
/// * `len` - The number of elements to allocate.
/// * `val` - The value every element is initialized with.
///
/// # Examples
///
/// ```
/// use vistrack_image::allocator::try_alloc_filled;
///
/// let buf = try_alloc_filled(16, 0u8).unwrap();
/// assert_eq!(buf.len(), 16);
/// ```
pub fn try_alloc_filled<T: Clone>(len: usize, val: T) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ImageError::OutOfMemory(len))?;
    data.resize(len, val);
    Ok(data)
}
