use crate::commands::helpers::run_on_document;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::host::{Host, ViewMode, EXPORT_PDF_COMMAND};

/// Export `path` through the host's export-to-PDF command. The page is the
/// print-ready HTML the export pipeline lays out.
pub fn run(host: &mut Host, path: &str, mode: ViewMode) -> Result<CmdResult> {
    let pages = run_on_document(host, path, mode, EXPORT_PDF_COMMAND)?;

    let mut result = CmdResult::default();
    for page in &pages {
        result.add_message(CmdMessage::success(format!("Exported {}", page.path)));
    }
    Ok(result.with_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{host, REPORT};
    use crate::host::OutputKind;
    use crate::render::BLOCK_STYLE;

    #[test]
    fn test_export_from_preview() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "report.md", ViewMode::Preview).unwrap();

        let page = &result.pages[0];
        assert_eq!(page.kind, OutputKind::Export);
        assert!(page.html.contains(r#"data-property="created""#));
        assert!(page.html.contains(BLOCK_STYLE.lines().next().unwrap()));
        assert_eq!(host.workspace.view("report.md").unwrap().block_count(), 1);
    }

    #[test]
    fn test_export_from_source_mode() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "report.md", ViewMode::Source).unwrap();

        let html = &result.pages[0].html;
        assert!(html.contains("<th>Property</th>"));
        assert!(!html.contains(r#"data-property="title""#));
        assert_eq!(host.store.read_text("report.md").unwrap(), REPORT);
        assert_eq!(result.messages[0].content, "Exported report.md");
    }

    #[test]
    fn test_export_plain_document() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "notes/plain.md", ViewMode::Source).unwrap();
        assert!(!result.pages[0].html.contains("<th>Property</th>"));
        assert!(result.pages[0].html.contains("Nothing up top."));
    }
}
