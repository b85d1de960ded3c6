use blog_core::BlogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid visibility ordinal {0} in post table")]
    InvalidVisibility(i64),
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
    #[error("unsupported schema version {0}")]
    UnsupportedSchema(i64),
}

impl From<StoreError> for BlogError {
    fn from(err: StoreError) -> Self {
        BlogError::Store(Box::new(err))
    }
}
