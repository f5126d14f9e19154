use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotterError {
    #[error("Not in a jotter notebook. Run 'jotter init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .jotter/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, JotterError>;
