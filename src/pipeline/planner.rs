use crate::config::{CropConfig, SteeringConfig};
use crate::shapes::rect::Rect;

/// Asymmetric crop around the dominant face. Each padding fraction is
/// scaled by the face's own size on the perpendicular axis, then the
/// whole rectangle is clamped to the frame. Falls back to the full
/// frame if the face box carries no usable area.
pub fn plan_crop(face: Rect, frame_w: u32, frame_h: u32, cfg: &CropConfig) -> Rect {
    let fw = face.w as f32;
    let fh = face.h as f32;

    let top = face.y - (fh * cfg.top).round() as i32;
    let bottom = face.y + (fh * (1.0 + cfg.bottom)).round() as i32;
    let left = face.x - (fw * cfg.left).round() as i32;
    let right = face.x + (fw * (1.0 + cfg.right)).round() as i32;

    Rect::from_corners(left, top, right, bottom)
        .clamp_to(frame_w, frame_h)
        .unwrap_or(Rect::new(0, 0, frame_w as i32, frame_h as i32))
}

/// Steering step to re-center the dominant face: negative when the
/// face sits left of the dead zone, positive when right of it, nothing
/// while inside.
pub fn plan_steering(face: Rect, frame_w: u32, cfg: &SteeringConfig) -> Option<f32> {
    let face_center = face.x as f32 + face.w as f32 / 2.0;
    let frame_center = frame_w as f32 / 2.0;

    if face_center < frame_center - cfg.dead_zone as f32 {
        Some(-cfg.step)
    } else if face_center > frame_center + cfg.dead_zone as f32 {
        Some(cfg.step)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop_cfg(top: f32, right: f32, bottom: f32, left: f32) -> CropConfig {
        CropConfig {
            enabled: true,
            top,
            right,
            bottom,
            left,
        }
    }

    fn steer_cfg(step: f32, dead_zone: i32) -> SteeringConfig {
        SteeringConfig {
            enabled: true,
            step,
            dead_zone,
            port: String::new(),
        }
    }

    #[test]
    fn crop_matches_reference_values_exactly() {
        let face = Rect::new(100, 50, 80, 60);
        let crop = plan_crop(face, 640, 480, &crop_cfg(0.5, 0.0, 0.15, 0.0));
        // rows [20, 119], cols [100, 180]
        assert_eq!(crop, Rect::from_corners(100, 20, 180, 119));
    }

    #[test]
    fn crop_clamps_to_frame_bounds() {
        let face = Rect::new(10, 5, 200, 200);
        let crop = plan_crop(face, 320, 240, &crop_cfg(1.0, 1.0, 1.0, 1.0));
        assert_eq!(crop, Rect::from_corners(0, 0, 320, 240));
    }

    #[test]
    fn degenerate_face_box_falls_back_to_full_frame() {
        let face = Rect::new(-500, -500, 10, 10);
        let crop = plan_crop(face, 640, 480, &crop_cfg(0.0, 0.0, 0.0, 0.0));
        assert_eq!(crop, Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn steering_reacts_outside_the_dead_zone() {
        let cfg = steer_cfg(5.0, 200);
        // frame_w 640, center 320
        let far_left = Rect::new(30, 0, 40, 40); // center 50
        let far_right = Rect::new(530, 0, 40, 40); // center 550
        let centered = Rect::new(300, 0, 40, 40); // center 320

        assert_eq!(plan_steering(far_left, 640, &cfg), Some(-5.0));
        assert_eq!(plan_steering(far_right, 640, &cfg), Some(5.0));
        assert_eq!(plan_steering(centered, 640, &cfg), None);
    }

    #[test]
    fn steering_is_quiet_at_the_dead_zone_edge() {
        let cfg = steer_cfg(5.0, 200);
        let at_edge = Rect::new(100, 0, 40, 40); // center 120 == 320 - 200
        assert_eq!(plan_steering(at_edge, 640, &cfg), None);
    }
}
