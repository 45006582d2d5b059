use crate::params::RenderingParameters;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

pub fn save_params_to_file(params: &RenderingParameters, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(params)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_params_from_file(path: &Path) -> Result<RenderingParameters> {
    let json = std::fs::read_to_string(path)?;
    let params: RenderingParameters = serde_json::from_str(&json)?;
    Ok(params)
}
