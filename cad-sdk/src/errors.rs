use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required request field is missing or malformed. Raised before any
    /// remote call is made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the service failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The service answered but reported an error of its own.
    #[error("{0} error: {1}")]
    Remote(&'static str, String),
    /// The response from the service was unusable (e.g. no text content in
    /// an assistant reply, a successful execution without a drawing).
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
