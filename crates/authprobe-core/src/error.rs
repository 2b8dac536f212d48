use thiserror::Error;

/// Fail-stop errors: conditions that end the run before a flow outcome
/// exists. Provider rejections, network failures, and callback timeouts are
/// not errors in this sense — they are reportable outcomes and travel as
/// `result::FlowStatus` values instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("preflight check failed: {0}")]
    Preflight(String),

    #[error("cancelled by user")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
