//! # Value Formatter
//!
//! Turns raw frontmatter values into display text. Two renditions exist:
//!
//! - [`ValueFormatter::format`] produces [`SafeHtml`] for the injected DOM block.
//!   Every text run is escaped for `& < > " '`; references become inert
//!   `#`-anchored links.
//! - [`ValueFormatter::format_plain`] produces unescaped text for the markdown
//!   block written by the patch fallback; references collapse to their display
//!   text. The markdown table escapes each cell before it is written.
//!
//! Formatting never fails. Anything that cannot be interpreted (a string that
//! looks like a date but is not one, a nested mapping) degrades to literal text.

pub mod date;
pub mod reference;

use serde_json::Value;
use std::fmt;

use reference::Segment;

/// Markup that is safe to splice into a document: all text has been escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wrap escaped text. Only for strings produced by [`escape_html`] or
    /// assembled from other `SafeHtml` pieces.
    pub(crate) fn from_trusted(html: String) -> Self {
        Self(html)
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape the five HTML metacharacters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Html,
    Plain,
}

/// Lists nested deeper than this are shown as structured text.
const MAX_LIST_DEPTH: usize = 2;

#[derive(Debug, Clone)]
pub struct ValueFormatter {
    date_format: String,
}

impl ValueFormatter {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn format(&self, value: &Value) -> SafeHtml {
        SafeHtml::from_trusted(self.format_at(value, 0, Flavor::Html))
    }

    pub fn format_plain(&self, value: &Value) -> String {
        self.format_at(value, 0, Flavor::Plain)
    }

    fn format_at(&self, value: &Value, depth: usize, flavor: Flavor) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.format_string(s, flavor),
            Value::Array(items) if depth < MAX_LIST_DEPTH => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| self.format_at(item, depth + 1, flavor))
                .collect::<Vec<_>>()
                .join(", "),
            Value::Array(_) | Value::Object(_) => structured(value, flavor),
        }
    }

    fn format_string(&self, raw: &str, flavor: Flavor) -> String {
        if let Some(formatted) = date::format_date_like(raw, &self.date_format) {
            return text(&formatted, flavor);
        }

        let mut out = String::with_capacity(raw.len());
        for segment in reference::segments(raw) {
            match (segment, flavor) {
                (Segment::Text(run), _) => out.push_str(&text(run, flavor)),
                (Segment::Reference { target, display }, Flavor::Html) => {
                    out.push_str(&reference_link(target, display))
                }
                (Segment::Reference { display, .. }, Flavor::Plain) => out.push_str(display),
            }
        }
        out
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_DATE_FORMAT)
    }
}

fn text(run: &str, flavor: Flavor) -> String {
    match flavor {
        Flavor::Html => escape_html(run),
        Flavor::Plain => run.to_string(),
    }
}

fn structured(value: &Value, flavor: Flavor) -> String {
    // Serializing a serde_json::Value cannot fail; the fallback keeps the formatter total.
    let json = serde_json::to_string(value).unwrap_or_default();
    text(&json, flavor)
}

fn reference_link(target: &str, display: &str) -> String {
    let target = escape_html(target);
    format!(
        r##"<a class="internal-link" data-href="{target}" href="#{target}">{}</a>"##,
        escape_html(display)
    )
}
