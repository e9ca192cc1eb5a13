use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Which pupil estimator runs on the eye crops, if any. With `Disabled`
/// the gaze verdict degenerates to the head-pose verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PupilMode {
    Disabled,
    #[default]
    DarkCentroid,
    GradientMeans,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacingConfig {
    /// Head angle (degrees) under which the face counts as facing, on
    /// both pitch and yaw.
    pub face_sensibility: f32,
    /// Tolerance (degrees) for the pupil-offset-vs-yaw cancellation on
    /// turned heads.
    pub gaze_sensibility: f32,
    /// Scale from pupil centering ratio to degrees. Hand-tuned linear
    /// proxy, not a calibrated model.
    pub ratio_multiplier: f32,
}

impl Default for FacingConfig {
    fn default() -> Self {
        Self {
            face_sensibility: 20.0,
            gaze_sensibility: 5.0,
            ratio_multiplier: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub enabled: bool,
    /// Padding fractions of the face's own size, clockwise from top.
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top: 0.5,
            right: 0.0,
            bottom: 0.15,
            left: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub enabled: bool,
    /// Step magnitude written to the actuator each off-center frame.
    pub step: f32,
    /// Half-width (pixels) of the centered band in which no command is
    /// emitted.
    pub dead_zone: i32,
    pub port: String,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            step: 5.0,
            dead_zone: 200,
            port: "/dev/ttyUSB0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    pub pupil_mode: PupilMode,
    pub facing: FacingConfig,
    /// (horizontal, vertical) pixel padding applied to the eye crops
    /// before pupil detection.
    pub eye_padding_h: i32,
    pub eye_padding_v: i32,
    pub crop: CropConfig,
    pub steering: SteeringConfig,
    pub annotate: bool,
    pub detector_model: String,
    pub mesh_model: String,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            pupil_mode: PupilMode::default(),
            facing: FacingConfig::default(),
            eye_padding_h: 0,
            eye_padding_v: 2,
            crop: CropConfig::default(),
            steering: SteeringConfig::default(),
            annotate: false,
            detector_model: "models/ultraface_rfb_320.onnx".to_string(),
            mesh_model: "models/mediapipe_face_landmark.onnx".to_string(),
        }
    }
}

impl GazeConfig {
    /// Load from a JSON file, falling back to defaults for missing
    /// fields or a missing file, then write the resolved config back so
    /// new fields show up on disk.
    pub fn load(path: &str) -> Result<Self> {
        let config = if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            match serde_json::from_str::<GazeConfig>(&content) {
                Ok(c) => {
                    info!("loaded configuration from {path}");
                    c
                }
                Err(e) => {
                    warn!("config parse error ({e}), using defaults");
                    Self::default()
                }
            }
        } else {
            info!("no config at {path}, creating defaults");
            Self::default()
        };

        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
