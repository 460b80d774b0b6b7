use crate::commands::helpers::run_on_document;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::host::{Host, ViewMode, PRINT_COMMAND};

/// Print `path` through the host's print command.
///
/// In [`ViewMode::Source`] the document has no live view, so the properties
/// reach the page through the patched document text.
pub fn run(host: &mut Host, path: &str, mode: ViewMode) -> Result<CmdResult> {
    let pages = run_on_document(host, path, mode, PRINT_COMMAND)?;

    let mut result = CmdResult::default();
    for page in &pages {
        result.add_message(CmdMessage::success(format!("Printed {}", page.path)));
    }
    Ok(result.with_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{host, REPORT};
    use crate::render::BLOCK_CLASS;

    fn blocks(html: &str) -> usize {
        html.matches(&format!(r#"class="{}""#, BLOCK_CLASS)).count()
    }

    #[test]
    fn test_print_from_preview() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "report.md", ViewMode::Preview).unwrap();

        assert_eq!(result.pages.len(), 1);
        assert_eq!(blocks(&result.pages[0].html), 1);
        assert_eq!(result.messages[0].content, "Printed report.md");
        assert!(host.outbox.is_empty());
    }

    #[test]
    fn test_print_from_source_mode_restores_text() {
        let (mut host, coordinator) = host();
        let result = run(&mut host, "report.md", ViewMode::Source).unwrap();

        let html = &result.pages[0].html;
        assert_eq!(blocks(html), 0);
        assert!(html.contains("<strong>title</strong>"));
        assert!(html.contains("2024-03-01 02:30 PM"));
        assert!(html.contains("the other note"));
        assert_eq!(host.store.read_text("report.md").unwrap(), REPORT);
        assert!(coordinator.outstanding_backups().is_empty());
    }

    #[test]
    fn test_print_missing_document() {
        let (mut host, _coordinator) = host();
        assert!(run(&mut host, "missing.md", ViewMode::Preview).is_err());
        assert!(host.outbox.is_empty());
    }
}
