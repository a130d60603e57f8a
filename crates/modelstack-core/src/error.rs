use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("not initialized: run 'modelstack init'")]
    NotInitialized,

    #[error("stack not found: {0}")]
    StackNotFound(String),

    #[error("stack {name} reached unexpected status {status}")]
    StackFailed { name: String, status: String },

    #[error("provider rejected request: {message}")]
    Provider { message: String },

    #[error("stack {name} did not converge after {polls} polls")]
    ConvergeTimeout { name: String, polls: u32 },

    #[error("malformed parameter file {}: {source}", .path.display())]
    MalformedParameterFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("invalid stack name '{0}': must be alphanumeric with hyphens")]
    InvalidStackName(String),

    #[error("model not found in catalog: {0}")]
    ModelNotFound(String),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
