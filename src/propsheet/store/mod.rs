//! # Storage Layer
//!
//! The [`DocumentStore`] trait is the document content I/O the rest of the crate
//! consumes: read and write a document's full text by its vault-relative path.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: markdown files below a vault directory.
//! - [`memory::InMemoryStore`]: documents in memory, for tests. It can be told to
//!   fail writes so the patch fallback's error paths can be exercised.
//!
//! Metadata is not stored separately: it is read from each document's
//! frontmatter by [`crate::metadata`].

use crate::error::Result;
use crate::model::DocPath;

pub mod fs;
pub mod memory;

pub trait DocumentStore {
    /// Read the full text of a document.
    fn read_text(&self, path: &str) -> Result<String>;

    /// Replace the full text of a document.
    fn write_text(&mut self, path: &str, text: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// All markdown documents, sorted by path.
    fn list_documents(&self) -> Result<Vec<DocPath>>;
}
