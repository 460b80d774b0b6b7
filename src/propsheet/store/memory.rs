use super::DocumentStore;
use crate::error::{PropsheetError, Result};
use crate::model::{normalize_path, DocPath};
use std::cell::Cell;
use std::collections::BTreeMap;

/// In-memory document store for testing.
///
/// Uses `Cell` for the failure switches since everything here is
/// single-threaded.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: BTreeMap<DocPath, String>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
    writes: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: &str, text: &str) -> Self {
        self.documents.insert(normalize_path(path), text.to_string());
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentStore for InMemoryStore {
    fn read_text(&self, path: &str) -> Result<String> {
        if self.fail_reads.get() {
            return Err(PropsheetError::Store("Simulated read error".to_string()));
        }
        self.documents
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| PropsheetError::DocumentNotFound(path.to_string()))
    }

    fn write_text(&mut self, path: &str, text: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(PropsheetError::Store("Simulated write error".to_string()));
        }
        self.documents.insert(normalize_path(path), text.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.documents.contains_key(&normalize_path(path))
    }

    fn list_documents(&self) -> Result<Vec<DocPath>> {
        Ok(self.documents.keys().cloned().collect())
    }
}
