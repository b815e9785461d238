use std::ops::{Deref, DerefMut};

use vistrack_image::{Frame, ImageSize};
use vistrack_imgproc::segment::Blob;

use crate::motion::MotionEstimate;

/// A producer of camera frames backed by a pool of buffers.
pub trait FrameSource {
    /// Take the next frame, or `None` if none is available.
    fn acquire(&mut self) -> Option<Frame>;

    /// Hand a frame back to the pool.
    fn release(&mut self, frame: Frame);
}

/// A frame borrowed from a [`FrameSource`], released back to it when dropped.
///
/// Every early return, `?` and panic unwinding through the holder releases the
/// frame exactly once.
pub struct AcquiredFrame<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    // always `Some` until dropped
    frame: Option<Frame>,
}

impl<'a, S: FrameSource + ?Sized> AcquiredFrame<'a, S> {
    /// Acquire a frame from `source`.
    pub fn acquire(source: &'a mut S) -> Option<Self> {
        let frame = source.acquire()?;
        Some(Self {
            source,
            frame: Some(frame),
        })
    }
}

impl<S: FrameSource + ?Sized> Deref for AcquiredFrame<'_, S> {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        self.frame.as_ref().expect("acquired frame is held until drop")
    }
}

impl<S: FrameSource + ?Sized> DerefMut for AcquiredFrame<'_, S> {
    fn deref_mut(&mut self) -> &mut Frame {
        self.frame.as_mut().expect("acquired frame is held until drop")
    }
}

impl<S: FrameSource + ?Sized> Drop for AcquiredFrame<'_, S> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.source.release(frame);
        }
    }
}

/// A consumer of the per-cycle results, typically driving actuators.
pub trait ActuationSink {
    /// Called with a target blob that passed the shape filter.
    fn on_blob(&mut self, blob: &Blob, frame_size: ImageSize);

    /// Called with a detected global motion when no target blob was acted on.
    fn on_motion(&mut self, motion: &MotionEstimate);
}

/// Ignores everything it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ActuationSink for NullSink {
    fn on_blob(&mut self, _blob: &Blob, _frame_size: ImageSize) {}

    fn on_motion(&mut self, _motion: &MotionEstimate) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistrack_image::ImageError;

    #[derive(Default)]
    struct Pool {
        free: Vec<Frame>,
        acquired: usize,
        released: usize,
    }

    impl FrameSource for Pool {
        fn acquire(&mut self) -> Option<Frame> {
            let frame = self.free.pop()?;
            self.acquired += 1;
            Some(frame)
        }

        fn release(&mut self, frame: Frame) {
            self.released += 1;
            self.free.push(frame);
        }
    }

    fn fails_midway(pool: &mut Pool) -> Result<(), ImageError> {
        let frame = AcquiredFrame::acquire(pool).ok_or(ImageError::InvalidArgument(
            "no frame".to_string(),
        ))?;
        frame.as_gray8()?;
        Ok(())
    }

    #[test]
    fn released_on_every_path() -> Result<(), ImageError> {
        let mut pool = Pool::default();
        pool.free.push(Frame::rgb565([4, 4].into(), vec![0; 16])?);

        {
            let mut frame = AcquiredFrame::acquire(&mut pool).ok_or(ImageError::InvalidArgument(
                "no frame".to_string(),
            ))?;
            frame.as_rgb565_mut()?.fill(7);
        }
        assert_eq!((pool.acquired, pool.released), (1, 1));
        assert_eq!(pool.free[0].as_rgb565()?.as_slice()[0], 7);

        assert!(fails_midway(&mut pool).is_err());
        assert_eq!((pool.acquired, pool.released), (2, 2));
        assert_eq!(pool.free.len(), 1);
        Ok(())
    }

    #[test]
    fn released_when_unwinding() -> Result<(), ImageError> {
        let mut pool = Pool::default();
        pool.free.push(Frame::gray8([4, 4].into(), vec![0; 16])?);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _frame = AcquiredFrame::acquire(&mut pool);
            panic!("stage failed");
        }));
        assert!(res.is_err());
        assert_eq!((pool.acquired, pool.released), (1, 1));
        assert_eq!(pool.free.len(), 1);
        Ok(())
    }

    #[test]
    fn empty_source() {
        let mut pool = Pool::default();
        assert!(AcquiredFrame::acquire(&mut pool).is_none());
        assert_eq!(pool.released, 0);
    }
}
