//! `[[target]]` / `[[target|display]]` reference syntax.

use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]").expect("reference pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Reference { target: &'a str, display: &'a str },
}

/// Split `text` into plain runs and references, in order.
///
/// An empty or whitespace-only display text falls back to the target. A
/// reference with a blank target stays literal text.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in REFERENCE.captures_iter(text) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let target = target.as_str().trim();
        if target.is_empty() {
            continue;
        }
        if whole.start() > last {
            out.push(Segment::Text(&text[last..whole.start()]));
        }
        let display = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|d| !d.is_empty())
            .unwrap_or(target);
        out.push(Segment::Reference { target, display });
        last = whole.end();
    }

    if last < text.len() {
        out.push(Segment::Text(&text[last..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_segment() {
        assert_eq!(segments("hello"), vec![Segment::Text("hello")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_reference_with_display() {
        assert_eq!(
            segments("see [[Note A|shown]] now"),
            vec![
                Segment::Text("see "),
                Segment::Reference {
                    target: "Note A",
                    display: "shown"
                },
                Segment::Text(" now"),
            ]
        );
    }

    #[test]
    fn test_reference_without_display() {
        assert_eq!(
            segments("[[Note A]]"),
            vec![Segment::Reference {
                target: "Note A",
                display: "Note A"
            }]
        );
    }

    #[test]
    fn test_empty_display_falls_back_to_target() {
        assert_eq!(
            segments("[[Note A|]]"),
            vec![Segment::Reference {
                target: "Note A",
                display: "Note A"
            }]
        );
    }

    #[test]
    fn test_blank_target_stays_text() {
        assert_eq!(segments("[[ ]]"), vec![Segment::Text("[[ ]]")]);
        assert_eq!(
            segments("a [[ |x]] [[B]]"),
            vec![
                Segment::Text("a [[ |x]] "),
                Segment::Reference {
                    target: "B",
                    display: "B"
                },
            ]
        );
    }

    #[test]
    fn test_unclosed_brackets_stay_text() {
        assert_eq!(segments("[[broken"), vec![Segment::Text("[[broken")]);
    }
}
