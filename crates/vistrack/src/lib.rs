#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use vistrack_image as image;

#[doc(inline)]
pub use vistrack_imgproc as imgproc;

#[doc(inline)]
pub use vistrack_tracking as tracking;
