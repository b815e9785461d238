//! Mapping of blobs and motion to a two-axis pan/tilt mount.
//!
//! A target blob sets absolute angles proportional to its offset from the
//! frame center. Global motion nudges the current angles in the opposite
//! direction to compensate it. Both write through a [`ServoDriver`], which is
//! where the PWM hardware lives.

use vistrack_image::ImageSize;
use vistrack_imgproc::segment::Blob;

use crate::{config::ControlConfig, motion::MotionEstimate, source::ActuationSink};

/// The neutral servo angle.
pub const CENTER_ANGLE: i32 = 90;
/// The largest servo angle.
pub const MAX_ANGLE: i32 = 180;

const MIN_PULSE_US: u32 = 500;
const MAX_PULSE_US: u32 = 2500;

/// A mount axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal rotation.
    Pan,
    /// Vertical rotation.
    Tilt,
}

/// Hardware that positions a servo.
pub trait ServoDriver {
    /// The driver failure type.
    type Error: std::error::Error;

    /// Move `axis` to `degrees`, in `0..=180`.
    fn set_angle(&mut self, axis: Axis, degrees: u8) -> Result<(), Self::Error>;
}

/// The pulse width in microseconds commanding `degrees` on a standard 50 Hz hobby servo.
pub fn servo_pulse_width_us(degrees: u8) -> u32 {
    let degrees = (degrees as u32).min(MAX_ANGLE as u32);
    MIN_PULSE_US + (MAX_PULSE_US - MIN_PULSE_US) * degrees / MAX_ANGLE as u32
}

fn clamp_angle(angle: i32) -> i32 {
    angle.clamp(0, MAX_ANGLE)
}

/// The absolute pan and tilt angles that point at `blob`.
///
/// The offset from the frame center is scaled so that an edge maps to 90
/// degrees away from the center. Tilt is inverted because rows grow downwards.
pub fn blob_angles(blob: &Blob, frame_size: ImageSize) -> (i32, i32) {
    let half_w = (frame_size.width / 2).max(1) as i32;
    let half_h = (frame_size.height / 2).max(1) as i32;
    let offset_x = blob.x as i32 - half_w;
    let offset_y = blob.y as i32 - half_h;

    let pan = CENTER_ANGLE + offset_x * CENTER_ANGLE / half_w;
    let tilt = CENTER_ANGLE - offset_y * CENTER_ANGLE / half_h;
    (clamp_angle(pan), clamp_angle(tilt))
}

/// Drives a pan/tilt mount from blobs and motion estimates.
pub struct PanTiltController<D: ServoDriver> {
    driver: D,
    min_confidence: f32,
    motion_gain: f32,
    pan: i32,
    tilt: i32,
}

impl<D: ServoDriver> PanTiltController<D> {
    /// Create a controller starting from the centered position.
    pub fn new(driver: D, config: &ControlConfig) -> Self {
        Self {
            driver,
            min_confidence: config.min_confidence,
            motion_gain: config.motion_gain,
            pan: CENTER_ANGLE,
            tilt: CENTER_ANGLE,
        }
    }

    /// The last commanded (pan, tilt) angles.
    pub fn angles(&self) -> (i32, i32) {
        (self.pan, self.tilt)
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Point the mount at a blob.
    pub fn track_blob(&mut self, blob: &Blob, frame_size: ImageSize) -> Result<(), D::Error> {
        if !blob.found {
            return Ok(());
        }
        let (pan, tilt) = blob_angles(blob, frame_size);
        self.move_to(pan, tilt)?;
        log::info!(
            "tracking blob at ({}, {}) -> pan {} tilt {}",
            blob.x,
            blob.y,
            pan,
            tilt
        );
        Ok(())
    }

    /// Nudge the mount against a detected motion.
    ///
    /// Motion that is not detected or below the minimum confidence is ignored.
    pub fn compensate_motion(&mut self, motion: &MotionEstimate) -> Result<(), D::Error> {
        if !motion.motion_detected || motion.confidence < self.min_confidence {
            return Ok(());
        }
        let adjust_x = (-motion.motion_x * self.motion_gain) as i32;
        let adjust_y = (-motion.motion_y * self.motion_gain) as i32;
        let (pan, tilt) = (
            clamp_angle(self.pan.saturating_add(adjust_x)),
            clamp_angle(self.tilt.saturating_add(adjust_y)),
        );
        self.move_to(pan, tilt)?;
        log::info!(
            "compensating motion ({:.2}, {:.2}) -> pan {} tilt {}, confidence {:.2}",
            motion.motion_x,
            motion.motion_y,
            pan,
            tilt,
            motion.confidence
        );
        Ok(())
    }

    fn move_to(&mut self, pan: i32, tilt: i32) -> Result<(), D::Error> {
        self.driver.set_angle(Axis::Pan, pan as u8)?;
        self.pan = pan;
        self.driver.set_angle(Axis::Tilt, tilt as u8)?;
        self.tilt = tilt;
        Ok(())
    }
}

impl<D: ServoDriver> ActuationSink for PanTiltController<D> {
    fn on_blob(&mut self, blob: &Blob, frame_size: ImageSize) {
        if let Err(err) = self.track_blob(blob, frame_size) {
            log::warn!("failed to move servos towards blob: {err}");
        }
    }

    fn on_motion(&mut self, motion: &MotionEstimate) {
        if let Err(err) = self.compensate_motion(motion) {
            log::warn!("failed to move servos against motion: {err}");
        }
    }
}
