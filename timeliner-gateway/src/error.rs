//! Gateway error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("not signed in or session expired")]
    Unauthorized,

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timeline not found: {0}")]
    NotFound(String),

    #[error("local store: {0}")]
    Store(#[from] timeliner_kernel::KernelError),
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
