use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Service(#[from] cad_sdk::ServiceError),
    /// The request was rejected before any remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Every attempt failed. Displays exactly the last attempt's error.
    #[error("{message}")]
    ExhaustedRetries { attempts: usize, message: String },
    #[error("A request is already being processed")]
    Busy,
    #[error("Invariant: {0}")]
    Invariant(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
