use super::detection::FaceDetector;
use super::model::{initialize_model, Session};
use crate::shapes::point::Point;
use crate::shapes::rect::Rect;
use anyhow::Result;
use image::{imageops::FilterType, GrayImage};
use ndarray::Array;
use ort::value::Tensor;
use tracing::{span, warn, Level};

const HEIGHT: u32 = 192;
const WIDTH: u32 = 192;
const MESH_POINTS: usize = 468;

// MediaPipe face-mesh indices for the named landmarks. "L" is the
// subject's left side, which sits on the image's right.
const NOSE: usize = 1;
const CHIN: usize = 152;
const EYE_L_IN: usize = 362;
const EYE_L_OUT: usize = 263;
const EYE_L_TOP: usize = 386;
const EYE_L_BOTTOM: usize = 374;
const EYE_R_IN: usize = 133;
const EYE_R_OUT: usize = 33;
const EYE_R_TOP: usize = 159;
const EYE_R_BOTTOM: usize = 145;
const MOUTH_L: usize = 291;
const MOUTH_R: usize = 61;

/// Named landmark record for one detected face. Fixed fields instead of
/// a keyed map: a face either has all of these or it is not a face.
///
/// For the left eye `eye_l_in.x < eye_l_out.x`; mirrored for the right.
#[derive(Debug, Clone, Copy)]
pub struct FaceLandmarks {
    pub nose: Point,
    pub chin: Point,
    pub eye_l_out: Point,
    pub eye_l_in: Point,
    pub eye_l_top: Point,
    pub eye_l_bottom: Point,
    pub eye_r_out: Point,
    pub eye_r_in: Point,
    pub eye_r_top: Point,
    pub eye_r_bottom: Point,
    pub mouth_l: Point,
    pub mouth_r: Point,
    pub bounds: Rect,
}

impl FaceLandmarks {
    pub fn points(&self) -> [Point; 12] {
        [
            self.nose,
            self.chin,
            self.eye_l_out,
            self.eye_l_in,
            self.eye_l_top,
            self.eye_l_bottom,
            self.eye_r_out,
            self.eye_r_in,
            self.eye_r_top,
            self.eye_r_bottom,
            self.mouth_l,
            self.mouth_r,
        ]
    }
}

/// Source of per-frame face records. Implemented by the bundled
/// detector+mesh stack; tests substitute canned faces.
pub trait LandmarkProvider {
    fn faces(&mut self, frame: &GrayImage) -> Result<Vec<FaceLandmarks>>;
}

pub struct MeshLandmarkProvider {
    detector: FaceDetector,
    model: Session,
}

impl MeshLandmarkProvider {
    pub fn new(detector_model: &str, mesh_model: &str) -> Result<MeshLandmarkProvider> {
        Ok(MeshLandmarkProvider {
            detector: FaceDetector::new(detector_model)?,
            model: initialize_model(mesh_model)?,
        })
    }

    fn landmark_face(&mut self, frame: &GrayImage, bounds: Rect) -> Result<FaceLandmarks> {
        // Pad 25% for mesh context, then clamp to the frame.
        let padded = Rect::new(
            bounds.x - bounds.w / 8,
            bounds.y - bounds.h / 8,
            bounds.w + bounds.w / 4,
            bounds.h + bounds.h / 4,
        );
        let roi = padded
            .clamp_to(frame.width(), frame.height())
            .unwrap_or(Rect::new(0, 0, frame.width() as i32, frame.height() as i32));

        let crop = image::imageops::crop_imm(
            frame,
            roi.x as u32,
            roi.y as u32,
            roi.w as u32,
            roi.h as u32,
        )
        .to_image();
        let resized = image::imageops::resize(&crop, WIDTH, HEIGHT, FilterType::Triangle);

        // NHWC, single channel replicated, -1..1 range.
        let input_arr = Array::from_shape_fn(
            (1, HEIGHT as usize, WIDTH as usize, 3),
            |(_, y, x, _c)| resized.get_pixel(x as u32, y as u32)[0] as f32 / 127.5 - 1.0,
        );

        let input = Tensor::from_array(input_arr)?;
        let outputs = self.model.run(ort::inputs!["input_1" => input]?)?;

        let mesh = outputs["conv2d_21"].try_extract_tensor::<f32>()?;
        let mesh = mesh.as_slice().unwrap();
        if mesh.len() < MESH_POINTS * 3 {
            return Err(anyhow::anyhow!(
                "mesh output too short: {} values",
                mesh.len()
            ));
        }

        let x_scale = roi.w as f32 / WIDTH as f32;
        let y_scale = roi.h as f32 / HEIGHT as f32;
        let at = |idx: usize| -> Point {
            Point::new(
                (roi.x as f32 + mesh[idx * 3] * x_scale).round() as i32,
                (roi.y as f32 + mesh[idx * 3 + 1] * y_scale).round() as i32,
            )
        };

        Ok(FaceLandmarks {
            nose: at(NOSE),
            chin: at(CHIN),
            eye_l_out: at(EYE_L_OUT),
            eye_l_in: at(EYE_L_IN),
            eye_l_top: at(EYE_L_TOP),
            eye_l_bottom: at(EYE_L_BOTTOM),
            eye_r_out: at(EYE_R_OUT),
            eye_r_in: at(EYE_R_IN),
            eye_r_top: at(EYE_R_TOP),
            eye_r_bottom: at(EYE_R_BOTTOM),
            mouth_l: at(MOUTH_L),
            mouth_r: at(MOUTH_R),
            bounds,
        })
    }
}

impl LandmarkProvider for MeshLandmarkProvider {
    fn faces(&mut self, frame: &GrayImage) -> Result<Vec<FaceLandmarks>> {
        let span = span!(Level::DEBUG, "landmark_provider");
        let _guard = span.enter();

        let mut faces = Vec::new();
        for face_box in self.detector.run(frame)? {
            // A mesh failure on one face must not drop the others.
            match self.landmark_face(frame, face_box.bounds) {
                Ok(face) => faces.push(face),
                Err(e) => warn!("landmark extraction failed for one face: {e}"),
            }
        }

        Ok(faces)
    }
}
