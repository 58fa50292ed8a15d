#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Line too long: {length} > {max_length}")]
    LineTooLong { length: usize, max_length: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),

    #[error("Event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Event transport failed: {0}")]
    Transport(#[from] std::io::Error),
}
