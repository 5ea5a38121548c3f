use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("serial error: {0}")]
    Serial(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("link reader thread disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, LinkError>;
