#![warn(unused_extern_crates)]

use anyhow::Result;
use clap::Parser;
use image::{ImageReader, RgbImage};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gazetrack::camera::{capture_frame, create_input_stream, OutputVideoStream};
use gazetrack::config::GazeConfig;
use gazetrack::pipeline::{FrameReport, GazePipeline};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Run a single detection on this image instead of the webcam.
    #[arg(short, long)]
    image_path: Option<String>,

    /// Where to save the single-image result.
    #[arg(short, long)]
    output_path: Option<String>,

    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "gazetrack.json")]
    config: String,

    /// Force annotation on regardless of configuration.
    #[arg(short, long)]
    annotate: bool,

    /// Requested capture frame rate in webcam mode.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = GazeConfig::load(&args.config)?;
    if args.annotate {
        config.annotate = true;
    }

    let mut pipeline = GazePipeline::new(config)?;

    if let Some(p) = &args.image_path {
        let mut img = ImageReader::open(p)?.decode()?.into_rgb8();

        let start = Instant::now();
        let report = pipeline.process(&mut img)?;
        debug!("took {:?}", start.elapsed());
        info!(
            gaze_facing = report.gaze_facing,
            faces = report.faces.len(),
            "single image processed"
        );

        let result = apply_crop(&img, &report);
        let output_path = match &args.output_path {
            Some(o) => o.clone(),
            None => edited_path(p),
        };
        result.save(&output_path)?;
        info!("result at {output_path}");
        return Ok(());
    }

    debug!("no image specified, running in webcam mode");
    run_webcam(&mut pipeline, args.fps)
}

fn run_webcam(pipeline: &mut GazePipeline, fps: u32) -> Result<()> {
    let mut camera = create_input_stream(fps)?;

    let mut output: Option<OutputVideoStream> = None;
    loop {
        let mut frame = match capture_frame(&mut camera) {
            Ok(f) => f,
            Err(e) => {
                warn!("frame capture failed: {e}");
                continue;
            }
        };

        let report = match pipeline.process(&mut frame) {
            Ok(r) => r,
            Err(e) => {
                warn!("frame processing failed: {e}");
                continue;
            }
        };

        debug!(
            gaze_facing = report.gaze_facing,
            steering = report.steering,
            "frame done"
        );

        // The raw-video display needs a fixed frame size, so webcam
        // mode shows the full annotated frame; the crop stays in the
        // report for downstream consumers.
        let stream = match &mut output {
            Some(s) => s,
            None => output.insert(OutputVideoStream::new(frame.width(), frame.height())?),
        };
        if let Err(e) = stream.write_frame(&frame) {
            // Viewer went away; stop cleanly after this frame.
            warn!("display stream closed: {e}");
            break;
        }
    }

    if let Some(s) = output {
        s.close()?;
    }
    Ok(())
}

fn apply_crop(frame: &RgbImage, report: &FrameReport) -> RgbImage {
    match report.crop {
        Some(c) => {
            image::imageops::crop_imm(frame, c.x as u32, c.y as u32, c.w as u32, c.h as u32)
                .to_image()
        }
        None => frame.clone(),
    }
}

fn edited_path(input: &str) -> String {
    let path = Path::new(input);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    match path.parent() {
        Some(dir) if dir != Path::new("") => {
            format!("{}/{stem}_edited.{ext}", dir.display())
        }
        _ => format!("{stem}_edited.{ext}"),
    }
}
