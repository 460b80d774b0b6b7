//! # Metadata Cache
//!
//! Reads the YAML frontmatter at the top of a markdown document into a
//! [`PropertyMap`]. Like the host cache it mirrors, the map carries a reserved
//! [`POSITION_KEY`] entry describing where the frontmatter sits in the text:
//!
//! ```text
//! position: { start: { line, col, offset }, end: { line, col, offset } }
//! ```
//!
//! That entry is bookkeeping and never shown to users.

use crate::model::{PropertyMap, POSITION_KEY};
use log::warn;
use serde_json::{json, Map, Number, Value};
use serde_yaml::Value as Yaml;

/// A document split at its frontmatter fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// YAML between the fences, `None` when the document has no frontmatter.
    pub yaml: Option<&'a str>,
    /// Everything after the closing fence (the whole text without frontmatter).
    pub body: &'a str,
    /// Byte offset where `body` starts.
    pub body_offset: usize,
    /// Zero-based line index of the closing fence.
    pub end_line: usize,
}

/// Split `text` into frontmatter and body.
///
/// The opening fence must be the very first line (`---`); the block closes at the
/// next `---` or `...` line. An unclosed fence means "no frontmatter".
pub fn split_frontmatter(text: &str) -> Frontmatter<'_> {
    let none = Frontmatter {
        yaml: None,
        body: text,
        body_offset: 0,
        end_line: 0,
    };

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return none;
    };
    if first.trim_end() != "---" {
        return none;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for (idx, line) in lines.enumerate() {
        let fence = line.trim_end();
        if fence == "---" || fence == "..." {
            let body_offset = offset + line.len();
            return Frontmatter {
                yaml: Some(&text[yaml_start..offset]),
                body: &text[body_offset..],
                body_offset,
                end_line: idx + 1,
            };
        }
        offset += line.len();
    }

    none
}

/// Properties of `text`, including the reserved position entry.
///
/// Returns `None` when there is no frontmatter, when it is empty, or when it is
/// not a mapping. Malformed YAML is logged and treated as absent.
pub fn read_properties(text: &str) -> Option<PropertyMap> {
    let split = split_frontmatter(text);
    let yaml = split.yaml?;

    let parsed: Yaml = match serde_yaml::from_str(yaml) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Ignoring malformed frontmatter: {}", e);
            return None;
        }
    };

    let mut properties = match yaml_to_json(parsed) {
        Value::Object(map) => map,
        Value::Null => return None,
        other => {
            warn!("Ignoring frontmatter that is not a mapping: {}", other);
            return None;
        }
    };

    let closing_fence = text[..split.body_offset].trim_end_matches(['\r', '\n']);
    properties.insert(
        POSITION_KEY.to_string(),
        json!({
            "start": { "line": 0, "col": 0, "offset": 0 },
            "end": { "line": split.end_line, "col": 3, "offset": closing_fence.len() },
        }),
    );
    Some(properties)
}

fn yaml_to_json(value: Yaml) -> Value {
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key(key: Yaml) -> String {
    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "---\ntitle: Report\ncreated: 2024-03-01\ntags:\n  - x\n  - y\n---\n# Heading\n\nBody\n";

    #[test]
    fn test_split_without_frontmatter() {
        let split = split_frontmatter("# Title\n---\n");
        assert!(split.yaml.is_none());
        assert_eq!(split.body, "# Title\n---\n");
        assert_eq!(split.body_offset, 0);
    }

    #[test]
    fn test_split_with_frontmatter() {
        let split = split_frontmatter(REPORT);
        assert_eq!(
            split.yaml,
            Some("title: Report\ncreated: 2024-03-01\ntags:\n  - x\n  - y\n")
        );
        assert_eq!(split.body, "# Heading\n\nBody\n");
        assert_eq!(split.end_line, 6);
        assert_eq!(&REPORT[split.body_offset..], split.body);
    }

    #[test]
    fn test_split_unclosed_is_body() {
        let split = split_frontmatter("---\ntitle: x\n");
        assert!(split.yaml.is_none());
    }

    #[test]
    fn test_split_crlf_and_dot_fence() {
        let text = "---\r\na: 1\r\n...\r\nbody";
        let split = split_frontmatter(text);
        assert_eq!(split.yaml, Some("a: 1\r\n"));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn test_read_properties_preserves_order() {
        let props = read_properties(REPORT).unwrap();
        let keys: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "created", "tags", "position"]);
        assert_eq!(props["created"], json!("2024-03-01"));
        assert_eq!(props["tags"], json!(["x", "y"]));
    }

    #[test]
    fn test_position_entry() {
        let props = read_properties(REPORT).unwrap();
        assert_eq!(props[POSITION_KEY]["end"]["line"], json!(6));
        let offset = props[POSITION_KEY]["end"]["offset"].as_u64().unwrap() as usize;
        assert!(REPORT[..offset].ends_with("---"));
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let props = read_properties("---\n1: one\ntrue: yes\n---\n").unwrap();
        assert_eq!(props["1"], json!("one"));
        assert!(props.contains_key("true"));
    }

    #[test]
    fn test_empty_or_scalar_frontmatter() {
        assert!(read_properties("---\n---\nbody").is_none());
        assert!(read_properties("---\njust a string\n---\n").is_none());
        assert!(read_properties("no frontmatter").is_none());
    }

    #[test]
    fn test_malformed_yaml_is_absent() {
        assert!(read_properties("---\nkey: [unclosed\n---\n").is_none());
    }

    #[test]
    fn test_nested_values() {
        let props = read_properties("---\nauthor:\n  name: Ada\n  year: 1843\nscore: 4.5\n---\n").unwrap();
        assert_eq!(props["author"], json!({"name": "Ada", "year": 1843}));
        assert_eq!(props["score"], json!(4.5));
    }
}
