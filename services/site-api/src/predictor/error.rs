use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("inference service responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected inference response: {0}")]
    Decode(String),
}
