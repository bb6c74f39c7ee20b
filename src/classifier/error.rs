use thiserror::Error;

use crate::preprocess::PreprocessError;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Transport failure (`status` is `None`) or a non-success HTTP status.
    #[error("remote service error{}: {message}", status_suffix(.status))]
    RemoteService { status: Option<u16>, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to encode raster: {0}")]
    Encode(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl ClassifyError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClassifyError::RemoteService { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<PreprocessError> for ClassifyError {
    fn from(err: PreprocessError) -> Self {
        ClassifyError::InvalidInput(err.to_string())
    }
}

impl From<reqwest::Error> for ClassifyError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        let err = err.without_url();
        ClassifyError::RemoteService {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
