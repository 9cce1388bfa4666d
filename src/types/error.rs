use thiserror::Error;

/// subtrack error types
#[derive(Error, Debug)]
pub enum SubtrackError {
    /// Data source missing, unreadable or malformed (fatal to a run)
    #[error("source error: {0}")]
    Source(String),

    /// Unparseable user-supplied value (e.g. a reference date)
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// HTTP server failed to bind or serve
    #[error("server error: {0}")]
    Server(String),
}

/// Result type alias for subtrack
pub type Result<T> = std::result::Result<T, SubtrackError>;
