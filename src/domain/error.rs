// Error taxonomy for the viewer core
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Malformed inbound frame. Contained by the dispatcher, never fatal.
    #[error("malformed frame: {0}")]
    Parse(String),

    /// Threshold level outside 1..=3.
    #[error("invalid threshold level {0}, expected 1..=3")]
    InvalidLevel(i64),

    /// Outbound command attempted while the connection is not open.
    #[error("not connected")]
    NotConnected,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ViewerError {
    fn from(e: serde_json::Error) -> Self {
        ViewerError::Parse(e.to_string())
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
