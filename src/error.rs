use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaybookError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, DaybookError>;
