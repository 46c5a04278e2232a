use std::io;

/// Errors raised at the fallible edges of the crate: settings files,
/// corpus lookups and replay scripts. The engine itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
