use argh::FromArgs;
use std::{convert::Infallible, path::PathBuf};

use vistrack::{
    image::{Frame, ImageSize},
    imgproc::{color::rgb565_from_rgb, schedule::ThreadYield},
    tracking::{
        control::{servo_pulse_width_us, Axis, PanTiltController, ServoDriver},
        pipeline::VisionPipeline,
        source::FrameSource,
        PipelineConfig,
    },
};

#[derive(FromArgs, Debug)]
/// Track a moving scene and a skin colored target on a synthetic camera feed
struct Args {
    /// number of frames to process
    #[argh(option, short = 'n', default = "60")]
    frames: u64,
    /// width of the frames
    #[argh(option, short = 'w', default = "160")]
    width: usize,
    /// height of the frames
    #[argh(option, short = 'H', default = "120")]
    height: usize,
    /// horizontal scene motion in pixels per frame
    #[argh(option, short = 's', default = "1.5")]
    speed: f32,
    /// path to a JSON pipeline configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,
}

/// A camera with a two-buffer pool rendering a panning texture and a target square.
struct SyntheticCamera {
    size: ImageSize,
    speed: f32,
    limit: u64,
    produced: u64,
    pool: Vec<Frame>,
}

impl SyntheticCamera {
    fn new(size: ImageSize, speed: f32, limit: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = (0..2)
            .map(|_| Frame::rgb565(size, vec![0; size.area()]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            size,
            speed,
            limit,
            produced: 0,
            pool,
        })
    }

    fn render(&self, frame: &mut Frame) {
        let Ok(image) = frame.as_rgb565_mut() else {
            return;
        };
        let (width, height) = (self.size.width, self.size.height);
        let shift = self.produced as f32 * self.speed;

        for (y, row) in image.as_slice_mut().chunks_exact_mut(width).enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                let (xx, yy) = (x as f32 - shift, y as f32);
                let v = 128.0
                    + 70.0 * (xx / 8.0).sin() * (yy / 8.0).sin()
                    + 35.0 * ((xx + yy) / 10.4).sin();
                let v = v.round() as u8;
                *px = rgb565_from_rgb([v, v, v]);
            }
        }

        // the target circles around the frame center
        let side = (width.min(height) / 5).max(12);
        let phase = self.produced as f32 / 10.0;
        let cx = width as f32 / 2.0 + phase.cos() * width as f32 / 4.0;
        let cy = height as f32 / 2.0 + phase.sin() * height as f32 / 4.0;
        let x0 = (cx as usize).saturating_sub(side / 2).min(width - side);
        let y0 = (cy as usize).saturating_sub(side / 2).min(height - side);
        let skin = rgb565_from_rgb([200, 120, 90]);
        for row in image.as_slice_mut().chunks_exact_mut(width).skip(y0).take(side) {
            row[x0..x0 + side].fill(skin);
        }
    }
}

impl FrameSource for SyntheticCamera {
    fn acquire(&mut self) -> Option<Frame> {
        if self.produced >= self.limit {
            return None;
        }
        let Some(mut frame) = self.pool.pop() else {
            log::warn!("frame pool exhausted");
            return None;
        };
        self.render(&mut frame);
        self.produced += 1;
        Some(frame)
    }

    fn release(&mut self, frame: Frame) {
        self.pool.push(frame);
    }
}

/// A servo driver that only logs the pulses it would send.
struct LoggingServo;

impl ServoDriver for LoggingServo {
    type Error = Infallible;

    fn set_angle(&mut self, axis: Axis, degrees: u8) -> Result<(), Infallible> {
        log::debug!(
            "{axis:?} -> {degrees} deg, pulse {} us",
            servo_pulse_width_us(degrees)
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    if size.width < 24 || size.height < 24 {
        return Err("frames must be at least 24x24".into());
    }

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut camera = SyntheticCamera::new(size, args.speed, args.frames)?;
    let mut controller = PanTiltController::new(LoggingServo, &config.control);
    let mut pipeline = VisionPipeline::new(size, config)?;

    while let Some(report) = pipeline.run_cycle(&mut camera, &mut controller, &mut ThreadYield)? {
        log::info!("{}", serde_json::to_string(&report)?);
    }

    let (pan, tilt) = controller.angles();
    log::info!(
        "processed {} frames, final pan {pan} tilt {tilt}",
        pipeline.frame_count()
    );

    pipeline.tracker_mut().deinit();

    Ok(())
}
