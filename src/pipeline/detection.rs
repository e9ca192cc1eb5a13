use super::model::{initialize_model, Session};
use crate::shapes::rect::Rect;
use anyhow::Result;
use image::{imageops::FilterType, GrayImage};
use ndarray::Array;
use ort::value::Tensor;
use tracing::trace;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const SCORE_THRESHOLD: f32 = 0.7;

// UltraFace box decode variances
const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;

pub struct FaceDetector {
    model: Session,
    anchors: Vec<(f32, f32, f32, f32)>, // cx, cy, w, h (normalized)
}

#[derive(Debug, Clone, Copy)]
pub struct FaceBox {
    pub bounds: Rect,
    pub confidence: f32,
}

impl FaceDetector {
    /*
    UltraFace (RFB-320) wrapper using ort to run the model, then
    manually decode the results into zero or more face boxes.

    Model input: 1x3x240x320 f32 image, (px - 127) / 128
    Model output:
    - "scores": [1, 4420, 2] background/face confidence pairs
    - "boxes": [1, 4420, 4] center/size offsets against a fixed
      anchor grid
    */
    pub fn new(model_path: &str) -> Result<FaceDetector> {
        Ok(FaceDetector {
            model: initialize_model(model_path)?,
            anchors: gen_anchors(),
        })
    }

    pub fn run(&mut self, frame: &GrayImage) -> Result<Vec<FaceBox>> {
        let resized = image::imageops::resize(frame, WIDTH, HEIGHT, FilterType::Triangle);

        // Single-channel input replicated across the three model
        // channels, NCHW layout.
        let input_arr = Array::from_shape_fn(
            (1, 3, HEIGHT as usize, WIDTH as usize),
            |(_, _c, y, x)| (resized.get_pixel(x as u32, y as u32)[0] as f32 - 127.0) / 128.0,
        );

        let input = Tensor::from_array(input_arr)?;
        let outputs = self.model.run(ort::inputs!["input" => input]?)?;

        let scores = outputs["scores"].try_extract_tensor::<f32>()?;
        let boxes = outputs["boxes"].try_extract_tensor::<f32>()?;

        let scores = scores.as_slice().unwrap();
        let boxes = boxes.as_slice().unwrap();

        let results = decode_detections(&self.anchors, scores, boxes, frame.width(), frame.height())?;
        trace!("detected {} faces", results.len());

        Ok(results)
    }
}

fn decode_detections(
    anchors: &[(f32, f32, f32, f32)],
    scores: &[f32],
    boxes: &[f32],
    frame_w: u32,
    frame_h: u32,
) -> Result<Vec<FaceBox>> {
    if scores.len() < anchors.len() * 2 || boxes.len() < anchors.len() * 4 {
        return Err(anyhow::anyhow!(
            "detector output too short: {} scores, {} box values for {} anchors",
            scores.len(),
            boxes.len(),
            anchors.len()
        ));
    }

    let x_scale = frame_w as f32 / WIDTH as f32;
    let y_scale = frame_h as f32 / HEIGHT as f32;

    let mut results: Vec<FaceBox> = Vec::new();

    for (i, &(ax, ay, aw, ah)) in anchors.iter().enumerate() {
        let score = scores[i * 2 + 1];
        if score <= SCORE_THRESHOLD {
            continue;
        }

        let cx = boxes[i * 4] * CENTER_VARIANCE * aw + ax;
        let cy = boxes[i * 4 + 1] * CENTER_VARIANCE * ah + ay;
        let w = (boxes[i * 4 + 2] * SIZE_VARIANCE).exp() * aw;
        let h = (boxes[i * 4 + 3] * SIZE_VARIANCE).exp() * ah;

        let bounds = Rect::new(
            (((cx - w / 2.0) * WIDTH as f32) * x_scale).round() as i32,
            (((cy - h / 2.0) * HEIGHT as f32) * y_scale).round() as i32,
            ((w * WIDTH as f32) * x_scale).round() as i32,
            ((h * HEIGHT as f32) * y_scale).round() as i32,
        );

        // Suppress overlapping candidates, keeping the more
        // confident box.
        let mut better_found = false;
        for (j, d) in results.iter().enumerate() {
            if d.bounds.overlap_pct(&bounds) > 30. {
                if d.confidence > score {
                    better_found = true;
                } else {
                    results.swap_remove(j);
                }
                break;
            }
        }
        if !better_found {
            results.push(FaceBox { bounds, confidence: score });
        }
    }

    Ok(results)
}

fn gen_anchors() -> Vec<(f32, f32, f32, f32)> {
    let shrinkages = [8u32, 16, 32, 64];
    let min_boxes: [&[f32]; 4] = [
        &[10.0, 16.0, 24.0],
        &[32.0, 48.0],
        &[64.0, 96.0],
        &[128.0, 192.0, 256.0],
    ];

    let w = WIDTH as f32;
    let h = HEIGHT as f32;
    let mut anchors = Vec::new();

    for (i, &shrinkage) in shrinkages.iter().enumerate() {
        let feature_h = (h / shrinkage as f32).ceil() as u32;
        let feature_w = (w / shrinkage as f32).ceil() as u32;

        for v in 0..feature_h {
            for u in 0..feature_w {
                let cx = (u as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / w;
                let cy = (v as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / h;

                for &min_box in min_boxes[i] {
                    anchors.push((cx, cy, min_box / w, min_box / h));
                }
            }
        }
    }

    anchors
}
