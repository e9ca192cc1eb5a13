use crate::error::{GazeError, Result};
use crate::pipeline::eyes::EyeRegion;
use crate::pipeline::landmarks::FaceLandmarks;
use crate::pipeline::pose::PoseEstimate;
use crate::shapes::point::Point;
use crate::shapes::rect::Rect;
use image::{Rgb, RgbImage};
use imageproc::drawing;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const PUPIL_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const AXIS_COLORS: [Rgb<u8>; 3] = [Rgb([255, 0, 0]), Rgb([0, 255, 0]), Rgb([0, 0, 255])];

/// Overlay one face's diagnostics onto the frame: bounding box, eye
/// regions, landmark dots, pupil circles and the projected pose axes.
/// Purely cosmetic; degenerate geometry becomes `AnnotationFailure`.
pub fn draw_face(
    img: &mut RgbImage,
    face: &FaceLandmarks,
    pose: &PoseEstimate,
    regions: Option<(&EyeRegion, &EyeRegion)>,
    pupils: (Option<Point>, Option<Point>),
) -> Result<()> {
    draw_rect(img, face.bounds)?;

    if let Some((left, right)) = regions {
        draw_rect(img, left.rect)?;
        draw_rect(img, right.rect)?;
    }

    for p in face.points() {
        drawing::draw_filled_circle_mut(img, (p.x, p.y), 2, LANDMARK_COLOR);
    }

    for pupil in [pupils.0, pupils.1].into_iter().flatten() {
        drawing::draw_hollow_circle_mut(img, (pupil.x, pupil.y), 10, PUPIL_COLOR);
    }

    let nose = (face.nose.x as f32, face.nose.y as f32);
    for (endpoint, color) in pose.axes.iter().zip(AXIS_COLORS) {
        drawing::draw_line_segment_mut(img, nose, (endpoint.x, endpoint.y), color);
    }

    Ok(())
}

fn draw_rect(img: &mut RgbImage, rect: Rect) -> Result<()> {
    let clamped = rect
        .clamp_to(img.width(), img.height())
        .ok_or_else(|| GazeError::AnnotationFailure(format!("rect {rect:?} outside frame")))?;

    drawing::draw_hollow_rect_mut(
        img,
        imageproc::rect::Rect::at(clamped.x, clamped.y).of_size(clamped.w as u32, clamped.h as u32),
        BOX_COLOR,
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pose::{GeometricPoseSolver, PosePoints, PoseSolver};

    fn face() -> FaceLandmarks {
        FaceLandmarks {
            nose: Point::new(100, 110),
            chin: Point::new(100, 160),
            eye_l_in: Point::new(110, 100),
            eye_l_out: Point::new(140, 100),
            eye_l_top: Point::new(125, 95),
            eye_l_bottom: Point::new(125, 105),
            eye_r_out: Point::new(60, 100),
            eye_r_in: Point::new(90, 100),
            eye_r_top: Point::new(75, 95),
            eye_r_bottom: Point::new(75, 105),
            mouth_l: Point::new(120, 140),
            mouth_r: Point::new(80, 140),
            bounds: Rect::new(50, 70, 100, 110),
        }
    }

    #[test]
    fn draws_without_error_on_a_normal_face() {
        let mut img = RgbImage::new(320, 240);
        let f = face();
        let pose = GeometricPoseSolver::default()
            .solve(320, 240, &PosePoints::from(&f))
            .unwrap();
        draw_face(&mut img, &f, &pose, None, (None, None)).unwrap();
    }

    #[test]
    fn off_frame_box_is_an_annotation_failure() {
        let mut img = RgbImage::new(320, 240);
        let mut f = face();
        f.bounds = Rect::new(1000, 1000, 50, 50);
        let pose = GeometricPoseSolver::default()
            .solve(320, 240, &PosePoints::from(&f))
            .unwrap();
        let err = draw_face(&mut img, &f, &pose, None, (None, None)).unwrap_err();
        assert!(matches!(err, GazeError::AnnotationFailure(_)));
    }
}
