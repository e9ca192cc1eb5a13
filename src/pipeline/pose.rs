use super::landmarks::FaceLandmarks;
use crate::error::{GazeError, Result};
use crate::shapes::point::{Point, PointF32};

/// Length in pixels of the projected axis lines drawn from the nose.
const AXIS_LEN: f32 = 60.0;

/// The six correspondence points a pose solve works from.
#[derive(Debug, Clone, Copy)]
pub struct PosePoints {
    pub nose: Point,
    pub chin: Point,
    pub eye_l_out: Point,
    pub eye_r_out: Point,
    pub mouth_l: Point,
    pub mouth_r: Point,
}

impl From<&FaceLandmarks> for PosePoints {
    fn from(f: &FaceLandmarks) -> PosePoints {
        PosePoints {
            nose: f.nose,
            chin: f.chin,
            eye_l_out: f.eye_l_out,
            eye_r_out: f.eye_r_out,
            mouth_l: f.mouth_l,
            mouth_r: f.mouth_r,
        }
    }
}

/// Head orientation in signed degrees plus the projected endpoints of
/// the head's x, y, z axes (anchored at the nose), for annotation.
///
/// Sign convention: positive yaw turns the nose toward the subject's
/// left eye (image right); positive pitch tips the nose up; positive
/// roll tilts the image-right eye downward.
#[derive(Debug, Clone, Copy)]
pub struct PoseEstimate {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub axes: [PointF32; 3],
}

/// Seam for the perspective solve. The bundled implementation is a
/// landmark-geometry approximation; a PnP solver slots in behind the
/// same trait.
pub trait PoseSolver {
    fn solve(&self, frame_w: u32, frame_h: u32, points: &PosePoints) -> Result<PoseEstimate>;
}

/// Estimates orientation from the 2-D layout of the six points: yaw
/// from where the nose sits between the outer eye corners, pitch from
/// where it sits between the eye line and the mouth line, roll from the
/// slope of the eye corners.
pub struct GeometricPoseSolver {
    yaw_scale: f32,
    pitch_scale: f32,
}

impl Default for GeometricPoseSolver {
    fn default() -> Self {
        // Full nose excursion to an eye corner reads as ~60 degrees;
        // eye-to-mouth excursion as ~90. Tuned against mirror footage.
        Self {
            yaw_scale: 60.0,
            pitch_scale: 90.0,
        }
    }
}

impl PoseSolver for GeometricPoseSolver {
    fn solve(&self, _frame_w: u32, _frame_h: u32, p: &PosePoints) -> Result<PoseEstimate> {
        // Image-left outer corner is the subject's right eye.
        let left_corner = PointF32::from(p.eye_r_out);
        let right_corner = PointF32::from(p.eye_l_out);
        let nose = PointF32::from(p.nose);

        let span_x = right_corner.x - left_corner.x;
        let span_y = right_corner.y - left_corner.y;
        let span = (span_x * span_x + span_y * span_y).sqrt();
        if span <= 0.0 {
            return Err(GazeError::GeometryDegenerate {
                context: "eye corner span",
            });
        }

        let roll = span_y.atan2(span_x).to_degrees();

        let eye_mid_x = (left_corner.x + right_corner.x) / 2.0;
        let eye_mid_y = (left_corner.y + right_corner.y) / 2.0;
        let yaw = (nose.x - eye_mid_x) / (span / 2.0) * self.yaw_scale;

        let mouth_mid_y = (p.mouth_l.y + p.mouth_r.y) as f32 / 2.0;
        let vertical = mouth_mid_y - eye_mid_y;
        if vertical <= 0.0 {
            return Err(GazeError::GeometryDegenerate {
                context: "eye-mouth vertical span",
            });
        }

        // At rest the nose tip sits about a quarter of the way down
        // from the eye line to the mouth line.
        let rest = eye_mid_y + vertical * 0.25;
        let pitch = (rest - nose.y) / vertical * self.pitch_scale;

        Ok(PoseEstimate {
            pitch,
            yaw,
            roll,
            axes: project_axes(nose, pitch, yaw, roll),
        })
    }
}

/// Project the rotated unit axes onto the image plane, anchored at the
/// nose tip. Enough for overlay lines; no camera intrinsics involved.
fn project_axes(nose: PointF32, pitch: f32, yaw: f32, roll: f32) -> [PointF32; 3] {
    let (sp, cp) = pitch.to_radians().sin_cos();
    let (sy, cy) = yaw.to_radians().sin_cos();
    let (sr, cr) = roll.to_radians().sin_cos();

    // R = Rz(roll) * Ry(yaw) * Rx(pitch), image y pointing down.
    let axis = |vx: f32, vy: f32, vz: f32| -> PointF32 {
        let (x1, y1, z1) = (vx, vy * cp - vz * sp, vy * sp + vz * cp);
        let (x2, y2) = (x1 * cy + z1 * sy, y1);
        let (x3, y3) = (x2 * cr - y2 * sr, x2 * sr + y2 * cr);
        PointF32::new(nose.x + AXIS_LEN * x3, nose.y - AXIS_LEN * y3)
    };

    [axis(1.0, 0.0, 0.0), axis(0.0, 1.0, 0.0), axis(0.0, 0.0, 1.0)]
}
