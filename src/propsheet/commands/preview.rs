use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PropsheetError, Result};
use crate::host::{Host, ViewMode};

/// Open `path` in a live preview and return the rendered page.
pub fn run(host: &mut Host, path: &str) -> Result<CmdResult> {
    host.open_document(path, ViewMode::Preview)?;
    let view = host
        .workspace
        .view(path)
        .ok_or_else(|| PropsheetError::DocumentNotFound(path.to_string()))?;

    let has_block = view.has_block();
    let mut result = CmdResult::default().with_rendered(view.to_html());
    if !has_block {
        result.add_message(CmdMessage::info(format!("{} has no properties to show", path)));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::host;
    use crate::commands::MessageLevel;

    #[test]
    fn test_preview_carries_properties() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "report.md").unwrap();

        let html = result.rendered.unwrap();
        assert!(html.contains(r#"data-property="title""#));
        assert!(html.contains(r#"data-property="created""#));
        assert!(html.contains("2024-03-01 02:30 PM"));
        assert!(html.contains(r##"<a class="internal-link" data-href="Other" href="#Other">the other note</a>"##));
        assert!(!html.contains(r#"data-property="tags""#));
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_preview_without_properties() {
        let (mut host, _coordinator) = host();
        let result = run(&mut host, "notes/plain.md").unwrap();

        assert!(result.rendered.unwrap().contains("Nothing up top."));
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn test_preview_missing_document() {
        let (mut host, _coordinator) = host();
        assert!(matches!(
            run(&mut host, "missing.md"),
            Err(PropsheetError::DocumentNotFound(_))
        ));
    }
}
