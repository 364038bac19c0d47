use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("missing credential `{0}` (set it in the environment or .env)")]
    MissingCredential(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing `{0}` column")]
    MissingColumn(&'static str),
    #[error("invalid date `{value}` on line {line}")]
    InvalidDate { line: usize, value: String },
}
