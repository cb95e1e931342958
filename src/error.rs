use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultError {
    #[error("`{0}` is not installed")]
    CapabilityMissing(&'static str),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write the report: {0}")]
    Output(#[source] std::io::Error),

    #[error("no subjects found in the result page")]
    NoSubjectsFound,

    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<reqwest::Error> for ResultError {
    fn from(e: reqwest::Error) -> Self {
        ResultError::Transfer(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResultError>;
