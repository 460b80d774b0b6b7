//! # Patch Fallback
//!
//! When a print or export runs without any DOM to inject into, the properties
//! travel inside the document text instead: the markdown block from
//! [`render_markdown`](crate::render::render_markdown) is spliced into the source,
//! the pipeline renders the patched text, and the original is written back.
//!
//! [`FileBackups`] holds the original text per document path between a
//! successful patch and its restore. At most one backup exists per path; a second
//! patch of an already patched document is a no-op, which is what keeps the
//! block from being spliced in twice when several triggers fire for one print.
//!
//! The block always lands after the frontmatter, so the patched text still
//! carries its properties for anything that reads them mid-export.

use crate::error::Result;
use crate::metadata::split_frontmatter;
use crate::model::{normalize_path, DocPath};
use crate::store::DocumentStore;
use log::{debug, error};
use std::collections::BTreeMap;

/// Original document texts, keyed by path.
#[derive(Debug, Default)]
pub struct FileBackups {
    entries: BTreeMap<DocPath, String>,
}

impl FileBackups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(&normalize_path(path)).map(String::as_str)
    }

    /// Record `original` for `path` unless a backup already exists.
    /// Returns whether the entry was created.
    fn insert(&mut self, path: &str, original: String) -> bool {
        let key = normalize_path(path);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, original);
        true
    }

    fn take(&mut self, path: &str) -> Option<String> {
        self.entries.remove(&normalize_path(path))
    }

    pub fn paths(&self) -> Vec<DocPath> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    AlreadyPatched,
}

/// Splice `block` into `text`.
///
/// With `after_heading`, the block follows the first top-level `# ` heading line of
/// the body (fenced code is skipped); otherwise, or when there is no such heading,
/// it opens the body.
pub fn patch_text(text: &str, block: &str, after_heading: bool) -> String {
    let split = split_frontmatter(text);
    let heading_end = if after_heading {
        first_heading_end(split.body).map(|end| split.body_offset + end)
    } else {
        None
    };

    let mut out = String::with_capacity(text.len() + block.len() + 4);
    match heading_end {
        Some(at) => {
            out.push_str(&text[..at]);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(block);
            if at < text.len() {
                out.push('\n');
            }
            out.push_str(&text[at..]);
        }
        None => {
            let at = split.body_offset;
            out.push_str(&text[..at]);
            // A closing fence on the last line still needs its own line.
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(block);
            if at < text.len() {
                out.push('\n');
            }
            out.push_str(&text[at..]);
        }
    }
    out
}

/// Byte offset just past the first top-level heading line, newline included.
fn first_heading_end(body: &str) -> Option<usize> {
    let mut offset = 0;
    let mut fence: Option<&str> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_end();
        let start = trimmed.trim_start();

        if let Some(open) = fence {
            if start.starts_with(open) {
                fence = None;
            }
        } else if start.starts_with("```") {
            fence = Some("```");
        } else if start.starts_with("~~~") {
            fence = Some("~~~");
        } else if trimmed == "#" || trimmed.starts_with("# ") {
            return Some(offset + line.len());
        }
        offset += line.len();
    }
    None
}

/// Patch `path` in `store`, recording its original text.
///
/// A read failure leaves no backup behind. A write failure deletes the backup it
/// just created, so the ledger never claims a patch that did not happen.
pub fn apply(
    store: &mut dyn DocumentStore,
    backups: &mut FileBackups,
    path: &str,
    block: &str,
    after_heading: bool,
) -> Result<PatchOutcome> {
    if backups.contains(path) {
        debug!("{} is already patched", path);
        return Ok(PatchOutcome::AlreadyPatched);
    }

    let original = store.read_text(path)?;
    let patched = patch_text(&original, block, after_heading);
    backups.insert(path, original);

    if let Err(e) = store.write_text(path, &patched) {
        backups.take(path);
        return Err(e);
    }
    debug!("Patched properties block into {}", path);
    Ok(PatchOutcome::Patched)
}

/// Write the original text of `path` back and drop its backup.
///
/// Returns `Ok(false)` when there was nothing to restore. On failure the backup
/// is still dropped and the failure is logged as an error: the document keeps
/// the patched block until someone fixes it by hand.
pub fn restore(store: &mut dyn DocumentStore, backups: &mut FileBackups, path: &str) -> Result<bool> {
    let Some(original) = backups.take(path) else {
        return Ok(false);
    };

    match store.write_text(path, &original) {
        Ok(()) => {
            debug!("Restored original text of {}", path);
            Ok(true)
        }
        Err(e) => {
            error!(
                "Failed to restore {}: the document still contains the injected properties block ({})",
                path, e
            );
            Err(e)
        }
    }
}
