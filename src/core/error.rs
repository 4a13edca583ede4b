use thiserror::Error;

use crate::host::HostError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Host callback was dropped without being invoked")]
    CallbackDropped,

    #[cfg(feature = "http")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request Failed. Status Code: {0}")]
    HttpStatus(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command `{command}` failed with code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Handler error: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<crate::core::callback::CallbackError<HostError>> for Error {
    fn from(err: crate::core::callback::CallbackError<HostError>) -> Self {
        match err {
            crate::core::callback::CallbackError::Failed(e) => Error::Host(e),
            crate::core::callback::CallbackError::Dropped => Error::CallbackDropped,
        }
    }
}

impl From<crate::core::callback::Dropped> for Error {
    fn from(_: crate::core::callback::Dropped) -> Self {
        Error::CallbackDropped
    }
}
