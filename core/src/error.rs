use crate::PostId;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("post {0} is already pinned")]
    AlreadyPinned(PostId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("lookup request failed: {message}")]
    Transport { message: String },
    #[error("lookup returned status {status}")]
    Status { status: u16 },
    #[error("malformed lookup response: {message}")]
    Decode { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid payload in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
