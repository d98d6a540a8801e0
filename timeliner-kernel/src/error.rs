//! Kernel error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    InvalidColor(#[from] timeliner_api::InvalidColor),
}

pub type Result<T, E = KernelError> = std::result::Result<T, E>;
