use vistrack_image::{Frame, ImageError};
use vistrack_imgproc::draw::{draw_cross, draw_line};

use crate::{
    feature::{FeaturePoint, FlowVector},
    tracker::OpticalFlowTracker,
};

/// Flow vectors are drawn this many times longer than they are.
pub const FLOW_SCALE: f32 = 5.0;

/// Arm length of the feature marker.
const MARKER_ARM: i64 = 2;

/// Draw a cross on every tracked feature and its scaled flow vector.
///
/// Features outside the frame are skipped, and a vector is drawn only if its
/// end point lies inside the frame.
pub fn draw_flow(
    frame: &mut Frame,
    features: &[FeaturePoint],
    flows: &[FlowVector],
    color: u16,
) -> Result<(), ImageError> {
    let image = frame.as_rgb565_mut()?;
    let cols = image.cols() as i64;
    let rows = image.rows() as i64;
    let inside = |x: i64, y: i64| x >= 0 && x < cols && y >= 0 && y < rows;

    for (feature, flow) in features.iter().zip(flows.iter()) {
        if !(feature.valid && flow.tracked) {
            continue;
        }

        let (x, y) = feature.rounded();
        if !inside(x, y) {
            continue;
        }
        draw_cross(image, (x, y), MARKER_ARM, [color]);

        let end_x = x + (flow.dx * FLOW_SCALE) as i64;
        let end_y = y + (flow.dy * FLOW_SCALE) as i64;
        if inside(end_x, end_y) {
            draw_line(image, (x, y), (end_x, end_y), [color], 1);
        }
    }

    Ok(())
}

/// Draw the features and flows of the tracker's last update.
pub fn draw_tracker_flow(
    frame: &mut Frame,
    tracker: &OpticalFlowTracker,
    color: u16,
) -> Result<(), ImageError> {
    if !tracker.is_initialized() {
        return Ok(());
    }
    draw_flow(frame, tracker.features(), tracker.flows(), color)
}
