use thiserror::Error;

/// Top-level error type shared by every EduGrid UI crate.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("sweep error: {0}")]
    Sweep(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = UiError> = std::result::Result<T, E>;
