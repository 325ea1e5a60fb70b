//! Error type shared by the fetch → parse → narrate → report pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A character entry has fewer reference URLs than the report needs.
    #[error("character '{name}' has no reference URL at position {position}")]
    MissingReferenceUrl { name: String, position: usize },

    #[error("invalid audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("invalid starting letter: {0:?}")]
    InvalidLetter(String),

    #[error("narration task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
