use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropsheetError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, PropsheetError>;
