use super::landmarks::FaceLandmarks;
use crate::error::{GazeError, Result};
use crate::shapes::point::Point;
use crate::shapes::rect::Rect;

/// Frame-absolute eye crop. `origin()` is the top-left corner used to
/// translate pupil coordinates back from crop-local space.
#[derive(Debug, Clone, Copy)]
pub struct EyeRegion {
    pub rect: Rect,
    pub pad_h: i32,
    pub pad_v: i32,
}

impl EyeRegion {
    pub fn origin(&self) -> Point {
        Point::new(self.rect.x, self.rect.y)
    }

    /// Crop-local pupil estimate -> frame coordinates.
    pub fn to_frame(&self, local: Point) -> Point {
        local.offset_by(self.origin())
    }
}

/// Build both eye crop rectangles from the landmark record. Vertical
/// bounds run lid to lid, horizontal bounds corner to corner, each
/// expanded by the configured padding. Pure geometry; the caller clamps
/// to the frame before touching pixels.
pub fn eye_regions(
    face: &FaceLandmarks,
    pad_h: i32,
    pad_v: i32,
) -> Result<(EyeRegion, EyeRegion)> {
    let left = region(
        face.eye_l_in.x,
        face.eye_l_out.x,
        face.eye_l_top.y,
        face.eye_l_bottom.y,
        pad_h,
        pad_v,
    )?;
    let right = region(
        face.eye_r_out.x,
        face.eye_r_in.x,
        face.eye_r_top.y,
        face.eye_r_bottom.y,
        pad_h,
        pad_v,
    )?;
    Ok((left, right))
}

fn region(
    first_x: i32,
    second_x: i32,
    top_y: i32,
    bottom_y: i32,
    pad_h: i32,
    pad_v: i32,
) -> Result<EyeRegion> {
    let rect = Rect::from_corners(
        first_x - pad_h,
        top_y - pad_v,
        second_x + pad_h,
        bottom_y + pad_v,
    );

    if rect.is_empty() {
        return Err(GazeError::GeometryDegenerate {
            context: "eye region",
        });
    }

    Ok(EyeRegion { rect, pad_h, pad_v })
}

/// How far the pupil sits from the eye's horizontal center, in
/// [-0.5, 0.5]; 0 is centered, the sign follows the reference corner
/// order. `origin_x` is the corner treated as 0, `far_x` as 1 (inner
/// corner first for the left eye, outer corner first for the right).
pub fn horizontal_ratio(pupil_x: i32, origin_x: i32, far_x: i32) -> Result<f32> {
    if far_x == origin_x {
        return Err(GazeError::GeometryDegenerate {
            context: "eye corner columns",
        });
    }

    Ok((pupil_x - origin_x) as f32 / (far_x - origin_x) as f32 - 0.5)
}

/// Ratios for both eyes of one face, given frame-space pupil points.
pub fn pupil_ratios(
    face: &FaceLandmarks,
    pupil_l: Point,
    pupil_r: Point,
) -> Result<(f32, f32)> {
    let r_l = horizontal_ratio(pupil_l.x, face.eye_l_in.x, face.eye_l_out.x)?;
    let r_r = horizontal_ratio(pupil_r.x, face.eye_r_out.x, face.eye_r_in.x)?;
    Ok((r_l, r_r))
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn regions_span_lids_and_corners_with_padding() {
        let (left, right) = eye_regions(&face(), 2, 3).unwrap();
        assert_eq!(left.rect, Rect::from_corners(108, 92, 142, 108));
        assert_eq!(right.rect, Rect::from_corners(58, 92, 92, 108));
    }

    #[test]
    fn inverted_lids_are_degenerate() {
        let mut f = face();
        f.eye_l_top.y = 106;
        f.eye_l_bottom.y = 95;
        let err = eye_regions(&f, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            GazeError::GeometryDegenerate { context: "eye region" }
        ));
    }

    #[test]
    fn local_pupil_translates_exactly() {
        let (left, _) = eye_regions(&face(), 0, 2).unwrap();
        let frame_pt = left.to_frame(Point::new(11, 4));
        assert_eq!(frame_pt, Point::new(110 + 11, 93 + 4));
        // Round trip back to local space.
        assert_eq!(
            Point::new(frame_pt.x - left.origin().x, frame_pt.y - left.origin().y),
            Point::new(11, 4)
        );
    }

    #[test]
    fn centered_pupil_has_zero_ratio() {
        let f = face();
        let (r_l, r_r) = pupil_ratios(&f, Point::new(125, 100), Point::new(75, 100)).unwrap();
        assert!(r_l.abs() < f32::EPSILON);
        assert!(r_r.abs() < f32::EPSILON);
    }

    #[test]
    fn ratio_sign_follows_reference_corner() {
        let f = face();
        // Toward the left eye's outer corner: positive.
        let r = horizontal_ratio(134, f.eye_l_in.x, f.eye_l_out.x).unwrap();
        assert!(r > 0.2);
        // At the origin corner: -0.5.
        let r = horizontal_ratio(110, f.eye_l_in.x, f.eye_l_out.x).unwrap();
        assert!((r + 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn identical_corner_columns_are_degenerate() {
        let err = horizontal_ratio(100, 90, 90).unwrap_err();
        assert!(matches!(
            err,
            GazeError::GeometryDegenerate { context: "eye corner columns" }
        ));
    }
}
