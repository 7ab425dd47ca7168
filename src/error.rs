use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilegoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid chunk size: {0}. Must be a positive number of bytes")]
    InvalidChunkSize(u64),

    #[error("Invalid chunk layout: {0}")]
    InvalidLayout(String),

    #[error("Chunk {index} is missing")]
    Incomplete { index: u64 },
}

pub type Result<T> = std::result::Result<T, FilegoError>;
