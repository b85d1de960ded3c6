use std::path::PathBuf;

use thiserror::Error;

use crate::model::PostId;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("no <h1> title found in rendered document")]
    NoTitleFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no published post found for handle '{0}'")]
    UnresolvedLink(String),
    #[error("resize failed for {}: {reason}", path.display())]
    ResizeToolFailure { path: PathBuf, reason: String },
    #[error("markdown renderer failed: {0}")]
    Render(String),
    #[error("post id {0} does not exist")]
    PostNotFound(PostId),
    #[error("post store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
