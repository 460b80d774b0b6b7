use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::format::ValueFormatter;
use crate::metadata::read_properties;
use crate::render::{render, render_markdown};
use crate::settings::Settings;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropsFormat {
    /// The fragment injected into rendered views.
    Html,
    /// The block the patch fallback writes into document text.
    Markdown,
}

pub fn run(
    store: &dyn DocumentStore,
    settings: &Settings,
    path: &str,
    format: PropsFormat,
) -> Result<CmdResult> {
    let text = store.read_text(path)?;
    let mut result = CmdResult::default();

    let Some(properties) = read_properties(&text) else {
        result.add_message(CmdMessage::info(format!("{} has no frontmatter", path)));
        return Ok(result);
    };

    let excluded = settings.excluded_names();
    let formatter = ValueFormatter::new(settings.date_format.as_str());
    let rendered = match format {
        PropsFormat::Html => render(&properties, &excluded, &formatter)
            .map(|fragment| fragment.html().as_str().to_string()),
        PropsFormat::Markdown => render_markdown(&properties, &excluded, &formatter),
    };

    match rendered {
        Some(rendered) => Ok(result.with_rendered(rendered)),
        None => {
            result.add_message(CmdMessage::info(format!(
                "Every property of {} is hidden",
                path
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{settings, store};
    use crate::error::PropsheetError;

    #[test]
    fn test_markdown_block() {
        let result = run(&store(), &settings(), "report.md", PropsFormat::Markdown).unwrap();
        assert_eq!(
            result.rendered.unwrap(),
            "| Property | Value |\n| --- | --- |\n\
             | **title** | Report |\n\
             | **created** | 2024-03-01 02:30 PM |\n\
             | **see** | the other note |\n"
        );
    }

    #[test]
    fn test_html_fragment() {
        let result = run(&store(), &settings(), "report.md", PropsFormat::Html).unwrap();
        let html = result.rendered.unwrap();
        assert!(html.starts_with(r#"<div class="propsheet-properties""#));
        assert_eq!(html.matches("<tr ").count(), 3);
    }

    #[test]
    fn test_custom_date_format() {
        let custom = Settings {
            date_format: "dd/MM/yyyy HH:mm".to_string(),
            ..settings()
        };
        let result = run(&store(), &custom, "report.md", PropsFormat::Markdown).unwrap();
        assert!(result.rendered.unwrap().contains("| **created** | 01/03/2024 14:30 |"));
    }

    #[test]
    fn test_everything_hidden() {
        let hide_all = Settings {
            excluded_properties: "title, created, tags, see".to_string(),
            ..settings()
        };
        let result = run(&store(), &hide_all, "report.md", PropsFormat::Html).unwrap();
        assert!(result.rendered.is_none());
        assert_eq!(result.messages[0].content, "Every property of report.md is hidden");
    }

    #[test]
    fn test_no_frontmatter() {
        let result = run(&store(), &settings(), "notes/plain.md", PropsFormat::Html).unwrap();
        assert!(result.rendered.is_none());
        assert_eq!(result.messages[0].content, "notes/plain.md has no frontmatter");
    }

    #[test]
    fn test_missing_document() {
        assert!(matches!(
            run(&store(), &settings(), "missing.md", PropsFormat::Html),
            Err(PropsheetError::DocumentNotFound(_))
        ));
    }
}
