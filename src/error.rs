use thiserror::Error;

/// Startup problems with the completion credential. Any of these halts the
/// chat for every session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no API key configured")]
    Missing,
    #[error("API key rejected: {0}")]
    Invalid(String),
}

/// Failure of a single exchange with the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion response had no message content")]
    EmptyResponse,
    #[error("invalid API key format: {0}")]
    InvalidCredential(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyMessage,
}
