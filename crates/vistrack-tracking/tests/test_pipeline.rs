mod common;

use std::collections::VecDeque;

use common::{rgb565_frame, SIZE};
use vistrack_image::{Frame, ImageError, ImageSize};
use vistrack_imgproc::{
    color::{rgb565_from_rgb, RGB565_BLACK, RGB565_GREEN},
    schedule::NoYield,
    segment::Blob,
};
use vistrack_tracking::{
    pipeline::VisionPipeline,
    source::{ActuationSink, FrameSource},
    MotionEstimate, PipelineConfig, TrackerError,
};

#[derive(Default)]
struct Queue {
    pending: VecDeque<Frame>,
    released: Vec<Frame>,
}

impl Queue {
    fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            released: Vec::new(),
        }
    }
}

impl FrameSource for Queue {
    fn acquire(&mut self) -> Option<Frame> {
        self.pending.pop_front()
    }

    fn release(&mut self, frame: Frame) {
        self.released.push(frame);
    }
}

#[derive(Default)]
struct Recorder {
    blobs: Vec<(Blob, ImageSize)>,
    motions: Vec<MotionEstimate>,
}

impl ActuationSink for Recorder {
    fn on_blob(&mut self, blob: &Blob, frame_size: ImageSize) {
        self.blobs.push((*blob, frame_size));
    }

    fn on_motion(&mut self, motion: &MotionEstimate) {
        self.motions.push(*motion);
    }
}

fn square_frame(x0: usize, y0: usize, side: usize) -> Result<Frame, ImageError> {
    let skin = rgb565_from_rgb([200, 120, 90]);
    let mut data = vec![RGB565_BLACK; SIZE.area()];
    for y in y0..y0 + side {
        data[y * SIZE.width + x0..y * SIZE.width + x0 + side].fill(skin);
    }
    Frame::rgb565(SIZE, data)
}

#[test]
fn motion_is_masked_and_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::default();
    config.control.blob_every_frames = 0;
    config.control.draw_overlay = false;
    config.mask.magnitude_threshold = 1.0;

    let mut pipeline = VisionPipeline::new(SIZE, config)?;
    let mut source = Queue::new([rgb565_frame(0.0)?, rgb565_frame(2.0)?]);
    let mut sink = Recorder::default();

    let first = pipeline
        .run_cycle(&mut source, &mut sink, &mut NoYield)?
        .ok_or("no first report")?;
    assert_eq!(first.frame_index, 1);
    assert!(first.reseeded);
    assert_eq!(first.valid_features, 20);
    assert!(!first.motion.motion_detected);
    assert_eq!(first.masked_pixels, 0);

    let second = pipeline
        .run_cycle(&mut source, &mut sink, &mut NoYield)?
        .ok_or("no second report")?;
    assert_eq!(second.frame_index, 2);
    assert!(second.blob.is_none());
    assert!(second.motion.motion_detected);
    assert!(second.motion.motion_x > 1.0);
    assert!(second.masked_pixels > 0);

    assert!(sink.blobs.is_empty());
    assert_eq!(sink.motions, vec![second.motion]);
    assert_eq!(source.released.len(), 2);

    let masked = source.released[1]
        .as_rgb565()?
        .as_slice()
        .iter()
        .filter(|&&v| v == 0xFFFF)
        .count();
    assert_eq!(masked, second.masked_pixels);

    assert!(pipeline
        .run_cycle(&mut source, &mut sink, &mut NoYield)?
        .is_none());
    assert_eq!(pipeline.frame_count(), 2);
    Ok(())
}

#[test]
fn blob_searched_every_third_frame() -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = VisionPipeline::new(SIZE, PipelineConfig::default())?;
    let frames = (0..3)
        .map(|_| square_frame(100, 40, 30))
        .collect::<Result<Vec<_>, _>>()?;
    let mut source = Queue::new(frames);
    let mut sink = Recorder::default();

    let mut reports = Vec::new();
    while let Some(report) = pipeline.run_cycle(&mut source, &mut sink, &mut NoYield)? {
        reports.push(report);
    }

    assert_eq!(reports.len(), 3);
    assert!(reports[0].blob.is_none());
    assert!(reports[1].blob.is_none());
    assert!(reports[2].blob_accepted);

    let expected = Blob {
        found: true,
        x: 114,
        y: 54,
        width: 30,
        height: 30,
        area: 900,
    };
    assert_eq!(reports[2].blob, Some(expected));
    assert_eq!(sink.blobs, vec![(expected, SIZE)]);
    assert!(sink.motions.is_empty());

    // the box is centered on the centroid
    let drawn = source.released[2].as_rgb565()?;
    assert_eq!(drawn.get_pixel(99, 39, 0)?, &RGB565_GREEN);
    assert_eq!(source.released[1].as_rgb565()?.get_pixel(99, 39, 0)?, &RGB565_BLACK);
    Ok(())
}

#[test]
fn rejected_blob_not_sent() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::default();
    config.control.blob_every_frames = 1;

    let mut pipeline = VisionPipeline::new(SIZE, config)?;
    // 80x80 matches 6400 pixels, above the area limit
    let mut source = Queue::new([square_frame(40, 20, 80)?]);
    let mut sink = Recorder::default();

    let report = pipeline
        .run_cycle(&mut source, &mut sink, &mut NoYield)?
        .ok_or("no report")?;
    assert!(report.blob.is_some_and(|blob| blob.found));
    assert!(!report.blob_accepted);
    assert!(sink.blobs.is_empty());
    Ok(())
}

#[test]
fn frame_released_on_tracker_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = VisionPipeline::new(SIZE, PipelineConfig::default())?;
    let small = Frame::rgb565([80, 60].into(), vec![0; 80 * 60])?;
    let mut source = Queue::new([small]);

    let result = pipeline.run_cycle(&mut source, &mut Recorder::default(), &mut NoYield);
    assert!(matches!(
        result,
        Err(TrackerError::Image(ImageError::InvalidImageSize(..)))
    ));
    assert_eq!(source.released.len(), 1);
    assert!(source.pending.is_empty());
    Ok(())
}

#[test]
fn invalid_config_rejected() {
    let mut config = PipelineConfig::default();
    config.tracker.capacity = 0;
    assert!(matches!(
        VisionPipeline::new(SIZE, config),
        Err(TrackerError::InvalidConfig(_))
    ));
}
