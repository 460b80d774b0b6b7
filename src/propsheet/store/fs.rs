use super::DocumentStore;
use crate::error::{PropsheetError, Result};
use crate::model::{normalize_path, DocPath};
use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_EXT: &str = "md";

/// Markdown documents below a vault root.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, path: &str) -> Result<PathBuf> {
        let relative = normalize_path(path);
        if relative.split('/').any(|part| part == "..") {
            return Err(PropsheetError::Store(format!(
                "Path escapes the vault: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<DocPath>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden {
                continue;
            }
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXT) {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    out.push(normalize_path(&relative.to_string_lossy()));
                }
            }
        }
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn read_text(&self, path: &str) -> Result<String> {
        let file = self.document_path(path)?;
        if !file.exists() {
            return Err(PropsheetError::DocumentNotFound(path.to_string()));
        }
        Ok(fs::read_to_string(file)?)
    }

    fn write_text(&mut self, path: &str, text: &str) -> Result<()> {
        let file = self.document_path(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        // Atomic: temp file, then rename.
        let tmp = file.with_extension("md.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &file)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.document_path(path)
            .map(|file| file.is_file())
            .unwrap_or(false)
    }

    fn list_documents(&self) -> Result<Vec<DocPath>> {
        let mut out = Vec::new();
        if self.root.exists() {
            self.collect(&self.root, &mut out)?;
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path().to_path_buf());

        store.write_text("notes/a.md", "# A").unwrap();
        assert_eq!(store.read_text("notes/a.md").unwrap(), "# A");
        assert!(store.exists("notes/a.md"));
        assert!(!temp.path().join("notes/a.md.tmp").exists());
    }

    #[test]
    fn test_missing_document() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().to_path_buf());
        assert!(matches!(
            store.read_text("missing.md"),
            Err(PropsheetError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path().to_path_buf());
        assert!(store.write_text("../outside.md", "x").is_err());
    }

    #[test]
    fn test_list_skips_hidden_and_non_markdown() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".propsheet")).unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join(".propsheet/settings.md"), "").unwrap();
        fs::write(temp.path().join("b.md"), "").unwrap();
        fs::write(temp.path().join("sub/a.md"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();

        let store = FileStore::new(temp.path().to_path_buf());
        assert_eq!(store.list_documents().unwrap(), vec!["b.md", "sub/a.md"]);
    }
}
