//! Core data types shared by every layer.
//!
//! Documents are addressed by their vault-relative path (`notes/report.md`), which
//! is also the key for [`FileBackup`](crate::patch::FileBackup) entries.

use serde_json::{Map, Value};

/// Vault-relative document path, always with forward slashes.
pub type DocPath = String;

/// Insertion-ordered frontmatter properties, name → raw value.
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration follows the
/// order the properties were written in the frontmatter.
pub type PropertyMap = Map<String, Value>;

/// The bookkeeping key the metadata cache adds next to user properties.
pub const POSITION_KEY: &str = "position";

/// Normalize a user supplied path into a [`DocPath`].
///
/// Backslashes become forward slashes and leading `./` or `/` are dropped.
pub fn normalize_path(path: &str) -> DocPath {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_prefixes() {
        assert_eq!(normalize_path("./notes/a.md"), "notes/a.md");
        assert_eq!(normalize_path("/a.md"), "a.md");
        assert_eq!(normalize_path("notes\\b.md"), "notes/b.md");
    }

    #[test]
    fn test_normalize_keeps_plain_paths() {
        assert_eq!(normalize_path("report.md"), "report.md");
    }
}
