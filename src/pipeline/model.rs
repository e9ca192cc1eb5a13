use crate::error::GazeError;
use anyhow::Result;
use ort::session::builder::GraphOptimizationLevel;
pub use ort::session::Session;
use std::path::Path;

/// Load an ONNX model for CPU inference. An absent file is a fatal
/// `MissingResource`: the pipeline refuses to construct without its
/// models rather than limping along.
pub fn initialize_model(model_path: &str) -> Result<Session> {
    if !Path::new(model_path).exists() {
        return Err(GazeError::MissingResource(model_path.into()).into());
    }

    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(model_path)?;

    Ok(model)
}
