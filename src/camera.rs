use anyhow::{anyhow, Result};
use image::{EncodableLayout, RgbImage};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

use nokhwa::{
    nokhwa_initialize,
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, RequestedFormat, RequestedFormatType},
    Camera,
};

pub fn create_input_stream(fps: u32) -> Result<Camera> {
    nokhwa_initialize(|granted| {
        debug!("camera permission granted: {granted}");
    });

    let cameras = query(ApiBackend::Auto)?;
    cameras
        .iter()
        .for_each(|cam| debug!("found camera: {cam:?}"));

    let index = cameras
        .last()
        .ok_or_else(|| anyhow!("no capture device available"))?
        .index()
        .clone();

    let mut camera = Camera::new(
        index,
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
    )?;

    camera.set_frame_rate(fps)?;
    camera.open_stream()?;
    Ok(camera)
}

pub fn capture_frame(camera: &mut Camera) -> Result<RgbImage> {
    let frame = camera.frame()?;
    Ok(frame.decode_image::<RgbFormat>()?)
}

/// Raw-video display through a piped ffplay process.
pub struct OutputVideoStream {
    ffplay: std::process::Child,
}

impl OutputVideoStream {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let ffplay = Command::new("ffplay")
            .args([
                "-f",
                "rawvideo",
                "-pixel_format",
                "rgb24",
                "-video_size",
                &format!("{width}x{height}"),
                "-framerate",
                "30",
                "-fflags",
                "nobuffer",
                "-flags",
                "low_delay",
                "-",
            ])
            .stdin(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { ffplay })
    }

    pub fn write_frame(&mut self, img: &RgbImage) -> Result<()> {
        if let Some(stdin) = self.ffplay.stdin.as_mut() {
            stdin.write_all(img.as_bytes())?;
            stdin.flush()?;
        }

        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        drop(self.ffplay.stdin.take());
        self.ffplay.wait()?;
        Ok(())
    }
}
