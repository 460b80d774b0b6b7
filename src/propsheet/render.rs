//! # Properties Renderer
//!
//! Builds the block that carries a document's properties into rendered output.
//!
//! The caller's map is never touched: [`visible_properties`] copies out the rows
//! to show, dropping the reserved [`POSITION_KEY`] and every excluded name
//! (case-sensitive exact match). When nothing is left there is no block at all,
//! and callers must treat `None` as "nothing to inject".
//!
//! Two renditions share that filtering:
//! - [`render`] produces the HTML [`Fragment`] placed into a DOM render target.
//! - [`render_markdown`] produces the markdown table the patch fallback splices
//!   into document text when no DOM is available.

use crate::format::{escape_html, SafeHtml, ValueFormatter};
use crate::model::{PropertyMap, POSITION_KEY};
use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use serde_json::Value;
use std::collections::BTreeSet;

/// Class carried by the block's outer element; the lookup key for
/// duplicate detection and removal.
pub const BLOCK_CLASS: &str = "propsheet-properties";

/// CSS selector matching an injected block.
pub const BLOCK_SELECTOR: &str = ".propsheet-properties";

/// Stylesheet embedded in printed and exported pages.
pub const BLOCK_STYLE: &str = "\
.propsheet-properties { margin: 0 0 1.5em 0; }
.propsheet-properties table { border-collapse: collapse; width: 100%; font-size: 0.9em; }
.propsheet-properties td { border: 1px solid #ccc; padding: 0.25em 0.6em; vertical-align: top; }
.propsheet-properties .propsheet-property-name { width: 30%; white-space: nowrap; }
@media print { .propsheet-properties { break-inside: avoid; } }
";

/// The rows that survive filtering, in original order.
pub fn visible_properties<'a>(
    properties: &'a PropertyMap,
    excluded: &BTreeSet<String>,
) -> Vec<(&'a str, &'a Value)> {
    properties
        .iter()
        .filter(|(name, _)| name.as_str() != POSITION_KEY && !excluded.contains(name.as_str()))
        .map(|(name, value)| (name.as_str(), value))
        .collect()
}

/// A rendered properties block, ready to be placed into a render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    html: SafeHtml,
    rows: usize,
}

impl Fragment {
    pub fn html(&self) -> &SafeHtml {
        &self.html
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Build a fresh, detached DOM node for this fragment.
    ///
    /// Each call returns a new node, so one fragment can be placed into several
    /// targets.
    pub fn to_node(&self) -> Option<NodeRef> {
        let document =
            kuchiki::parse_html().one(format!("<html><body>{}</body></html>", self.html));
        let block = document.select_first(BLOCK_SELECTOR).ok()?;
        let node = block.as_node().clone();
        node.detach();
        Some(node)
    }
}

pub fn render(
    properties: &PropertyMap,
    excluded: &BTreeSet<String>,
    formatter: &ValueFormatter,
) -> Option<Fragment> {
    let rows = visible_properties(properties, excluded);
    if rows.is_empty() {
        return None;
    }

    let mut html = format!(
        r#"<div class="{BLOCK_CLASS}" data-propsheet="properties"><table class="propsheet-properties-table"><tbody>"#
    );
    for (name, value) in &rows {
        let name = escape_html(name);
        html.push_str(&format!(
            r#"<tr class="propsheet-property" data-property="{name}"><td class="propsheet-property-name"><strong>{name}</strong></td><td class="propsheet-property-value">{}</td></tr>"#,
            formatter.format(value)
        ));
    }
    html.push_str("</tbody></table></div>");

    Some(Fragment {
        html: SafeHtml::from_trusted(html),
        rows: rows.len(),
    })
}

/// The same rows as [`render`], as a markdown table.
pub fn render_markdown(
    properties: &PropertyMap,
    excluded: &BTreeSet<String>,
    formatter: &ValueFormatter,
) -> Option<String> {
    let rows = visible_properties(properties, excluded);
    if rows.is_empty() {
        return None;
    }

    let mut out = String::from("| Property | Value |\n| --- | --- |\n");
    for (name, value) in rows {
        out.push_str(&format!(
            "| **{}** | {} |\n",
            markdown_cell(name).replace('*', "\\*"),
            markdown_cell(&formatter.format_plain(value))
        ));
    }
    Some(out)
}

/// One table cell: a single line, HTML metacharacters escaped, pipes guarded.
fn markdown_cell(text: &str) -> String {
    escape_html(text)
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> PropertyMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn excluded(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_empty_map_renders_nothing() {
        let formatter = ValueFormatter::default();
        assert!(render(&PropertyMap::new(), &excluded(&[]), &formatter).is_none());
        assert!(render_markdown(&PropertyMap::new(), &excluded(&[]), &formatter).is_none());
    }

    #[test]
    fn test_only_hidden_keys_renders_nothing() {
        let map = props(json!({"position": {"start": 0}, "tags": ["a"]}));
        let formatter = ValueFormatter::default();
        assert!(render(&map, &excluded(&["tags"]), &formatter).is_none());
    }

    #[test]
    fn test_position_and_excluded_rows_dropped() {
        let map = props(json!({
            "title": "Report",
            "position": {"start": 0},
            "tags": ["x"],
            "Tags": "kept"
        }));
        let fragment = render(&map, &excluded(&["tags"]), &ValueFormatter::default()).unwrap();
        assert_eq!(fragment.rows(), 2);
        let html = fragment.html().as_str();
        assert!(!html.contains(r#"data-property="position""#));
        assert!(!html.contains(r#"data-property="tags""#));
        assert!(html.contains(r#"data-property="Tags""#));
    }

    #[test]
    fn test_caller_map_untouched() {
        let map = props(json!({"position": 1, "a": "b"}));
        let before = map.clone();
        render(&map, &excluded(&["a"]), &ValueFormatter::default());
        assert_eq!(map, before);
    }

    #[test]
    fn test_tags_shown_unless_excluded() {
        let map = props(json!({"tags": ["x", "y"]}));
        let fragment = render(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();
        assert!(fragment.html().as_str().contains("x, y"));
    }

    #[test]
    fn test_rows_in_insertion_order() {
        let map = props(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let fragment = render(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();
        let html = fragment.html().as_str();
        let zeta = html.find("zeta").unwrap();
        let alpha = html.find("alpha").unwrap();
        let mid = html.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_names_are_escaped() {
        let map = props(json!({"<b>": "v"}));
        let fragment = render(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();
        assert!(fragment.html().as_str().contains("<strong>&lt;b&gt;</strong>"));
    }

    #[test]
    fn test_to_node_builds_marked_block() {
        let map = props(json!({"title": "Report", "link": "[[Note A|shown]]"}));
        let fragment = render(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();

        let node = fragment.to_node().unwrap();
        assert!(node.parent().is_none());
        let rows: Vec<_> = node.select("tr").unwrap().collect();
        assert_eq!(rows.len(), 2);
        let anchor = node.select_first("a.internal-link").unwrap();
        assert_eq!(anchor.as_node().text_contents(), "shown");
        assert_eq!(anchor.attributes.borrow().get("href"), Some("#Note A"));
    }

    #[test]
    fn test_markdown_table() {
        let map = props(json!({
            "title": "Report | Q1",
            "created": "2024-03-01",
            "see": "[[Other|the other]]",
            "notes": "line one\nline two"
        }));
        let table = render_markdown(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();
        assert_eq!(
            table,
            "| Property | Value |\n| --- | --- |\n\
             | **title** | Report \\| Q1 |\n\
             | **created** | 2024-03-01 |\n\
             | **see** | the other |\n\
             | **notes** | line one line two |\n"
        );
    }

    #[test]
    fn test_markdown_cells_are_escaped() {
        let map = props(json!({
            "<b>": "<script>alert('x')</script>",
            "see": "[[R&D|a < b]]"
        }));
        let table = render_markdown(&map, &excluded(&[]), &ValueFormatter::default()).unwrap();
        assert!(!table.contains('<'));
        assert!(table.contains("| **&lt;b&gt;** | &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; |"));
        assert!(table.contains("| **see** | a &lt; b |"));
    }
}
