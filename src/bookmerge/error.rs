use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("Bookmark not found: {0}")]
    NodeNotFound(String),

    #[error("Group is not empty: {0}")]
    NonEmptyGroup(String),

    #[error("Can't modify the root bookmark groups: {0}")]
    RootGroup(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Index {index} is out of range for group {parent} ({len} children)")]
    IndexOutOfRange {
        parent: String,
        index: usize,
        len: usize,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl BookmarkError {
    /// True for failures raised by the bookmark store (as opposed to parsing
    /// or configuration problems).
    pub fn is_store_error(&self) -> bool {
        !matches!(self, BookmarkError::Parse(_) | BookmarkError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, BookmarkError>;
