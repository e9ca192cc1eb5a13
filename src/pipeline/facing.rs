use crate::config::FacingConfig;

/// Per-face verdict: head pointed at the camera, and gaze (head plus
/// pupils) pointed at the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing {
    pub face_facing: bool,
    pub gaze_facing: bool,
}

/// Classify one face from its head angles and, when pupil detection
/// ran, the horizontal pupil centering ratios of both eyes.
///
/// A near-frontal head tolerates only a small pupil offset (the angle
/// threshold scaled down by the ratio multiplier). A turned head faces
/// the camera when the chosen eye's pupil offset, scaled up by the
/// multiplier, roughly cancels the yaw. That cancellation is a
/// hand-tuned linear proxy, which is why every constant in it comes
/// from configuration.
pub fn classify(pitch: f32, yaw: f32, ratios: Option<(f32, f32)>, cfg: &FacingConfig) -> Facing {
    let t_f = cfg.face_sensibility;
    let t_g = cfg.gaze_sensibility;
    let m = cfg.ratio_multiplier;

    let face_facing = pitch.abs() < t_f && yaw.abs() < t_f;

    let gaze_facing = match ratios {
        None => face_facing,
        Some((r_l, r_r)) => {
            if face_facing {
                r_l.abs().max(r_r.abs()) < t_f / m
            } else if yaw < 0.0 {
                (2.0 * r_l.abs() * m - yaw.abs()).abs() < t_g
            } else if yaw > 0.0 {
                (2.0 * r_r.abs() * m - yaw.abs()).abs() < t_g
            } else {
                // yaw == 0 with a non-facing pitch: contradictory
                // inputs, never claim gaze contact.
                false
            }
        }
    };

    Facing {
        face_facing,
        gaze_facing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FacingConfig {
        FacingConfig {
            face_sensibility: 20.0,
            gaze_sensibility: 5.0,
            ratio_multiplier: 100.0,
        }
    }

    #[test]
    fn face_facing_inside_threshold_on_both_axes() {
        assert!(classify(0.0, 0.0, None, &cfg()).face_facing);
        assert!(classify(19.9, -19.9, None, &cfg()).face_facing);
        assert!(classify(-10.0, 5.0, None, &cfg()).face_facing);
    }

    #[test]
    fn face_not_facing_at_or_beyond_threshold() {
        assert!(!classify(20.0, 0.0, None, &cfg()).face_facing);
        assert!(!classify(0.0, 20.0, None, &cfg()).face_facing);
        assert!(!classify(-25.0, 0.0, None, &cfg()).face_facing);
        assert!(!classify(0.0, -31.0, None, &cfg()).face_facing);
    }

    #[test]
    fn without_ratios_gaze_mirrors_face() {
        let f = classify(5.0, 5.0, None, &cfg());
        assert_eq!(f.face_facing, f.gaze_facing);
        let f = classify(40.0, 0.0, None, &cfg());
        assert_eq!(f.face_facing, f.gaze_facing);
        assert!(!f.gaze_facing);
    }

    #[test]
    fn frontal_head_tolerates_small_pupil_offsets() {
        // Bound is T_f / M = 0.2.
        assert!(classify(0.0, 0.0, Some((0.1, -0.1)), &cfg()).gaze_facing);
        assert!(classify(0.0, 0.0, Some((0.0, 0.19)), &cfg()).gaze_facing);
        assert!(!classify(0.0, 0.0, Some((0.2, 0.0)), &cfg()).gaze_facing);
        assert!(!classify(0.0, 0.0, Some((0.0, -0.3)), &cfg()).gaze_facing);
    }

    #[test]
    fn turned_head_negative_yaw_uses_left_eye_cancellation() {
        // yaw = -30, T_g = 5, M = 100: gaze iff |r_l| in (0.125, 0.175).
        let c = cfg();
        assert!(classify(0.0, -30.0, Some((0.15, 0.0)), &c).gaze_facing);
        assert!(classify(0.0, -30.0, Some((-0.13, 0.0)), &c).gaze_facing);
        assert!(classify(0.0, -30.0, Some((0.174, 0.0)), &c).gaze_facing);
        assert!(!classify(0.0, -30.0, Some((0.125, 0.0)), &c).gaze_facing);
        assert!(!classify(0.0, -30.0, Some((0.18, 0.0)), &c).gaze_facing);
        assert!(!classify(0.0, -30.0, Some((0.0, 0.0)), &c).gaze_facing);
        // The right eye's ratio is ignored on negative yaw.
        assert!(classify(0.0, -30.0, Some((0.15, 0.4)), &c).gaze_facing);
    }

    #[test]
    fn turned_head_positive_yaw_uses_right_eye_cancellation() {
        let c = cfg();
        assert!(classify(0.0, 30.0, Some((0.0, 0.15)), &c).gaze_facing);
        assert!(!classify(0.0, 30.0, Some((0.15, 0.0)), &c).gaze_facing);
    }

    #[test]
    fn zero_yaw_with_non_facing_pitch_never_claims_gaze() {
        let f = classify(45.0, 0.0, Some((0.0, 0.0)), &cfg());
        assert!(!f.face_facing);
        assert!(!f.gaze_facing);
    }
}
