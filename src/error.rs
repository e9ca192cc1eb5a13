use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazeError {
    /// A model or other required file was absent at startup. Fatal:
    /// construction aborts, nothing recoverable about it.
    #[error("missing resource: {0}")]
    MissingResource(PathBuf),

    /// No face in the frame. The frame still passes through with
    /// gaze_facing = false.
    #[error("no face detected in frame")]
    DetectionEmpty,

    /// Landmark geometry collapsed (zero-area eye crop, identical eye
    /// corner columns). Scoped to one face; pose-only facing is still
    /// reported for it.
    #[error("degenerate geometry in {context}")]
    GeometryDegenerate { context: &'static str },

    /// Actuator write failed. Logged and ignored; the next frame may
    /// succeed.
    #[error("actuator transport failure: {0}")]
    TransportFailure(#[from] std::io::Error),

    /// Overlay drawing failed. Cosmetic only.
    #[error("annotation failure: {0}")]
    AnnotationFailure(String),
}

pub type Result<T> = std::result::Result<T, GazeError>;
