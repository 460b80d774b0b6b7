//! Date detection and template formatting.
//!
//! Values shaped like `YYYY-MM-DD`, optionally followed by `T` or a space and
//! `HH:MM[:SS[.fff]]` plus an optional zone, are re-rendered through the user's
//! date template. Templates use the familiar token style (`yyyy-MM-dd`,
//! `dd MMM yyyy`, `EEEE`, `HH:mm`), translated here to chrono's strftime items.
//! A zone suffix is accepted but not applied: the wall-clock time is shown as written.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

use crate::settings::DEFAULT_DATE_FORMAT;

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?\s*(?:Z|[+-]\d{2}(?::?\d{2})?)?)?$",
    )
    .expect("date pattern is valid")
});

/// Template tokens, longest first so `yyyy` wins over `yy`.
const TOKENS: &[(&str, &str, bool)] = &[
    ("yyyy", "%Y", false),
    ("YYYY", "%Y", false),
    ("MMMM", "%B", false),
    ("EEEE", "%A", false),
    ("dddd", "%A", false),
    ("MMM", "%b", false),
    ("EEE", "%a", false),
    ("ddd", "%a", false),
    ("yy", "%y", false),
    ("YY", "%y", false),
    ("MM", "%m", false),
    ("dd", "%d", false),
    ("DD", "%d", false),
    ("HH", "%H", true),
    ("hh", "%I", true),
    ("mm", "%M", true),
    ("ss", "%S", true),
    ("M", "%-m", false),
    ("d", "%-d", false),
    ("D", "%-d", false),
    ("H", "%-H", true),
    ("h", "%-I", true),
    ("m", "%-M", true),
    ("s", "%-S", true),
    ("a", "%p", true),
    ("A", "%p", true),
];

/// A parsed date-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLike {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

/// Parse a date or datetime string. `None` means "not a date", including
/// strings that match the shape but name an impossible day or hour.
pub fn parse_date_like(raw: &str) -> Option<DateLike> {
    let caps = DATE_LIKE.captures(raw.trim())?;
    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;

    let time = match (number(4), number(5)) {
        (Some(hour), Some(minute)) => Some(NaiveTime::from_hms_opt(
            hour,
            minute,
            number(6).unwrap_or(0),
        )?),
        _ => None,
    };

    Some(DateLike { date, time })
}

struct CompiledTemplate {
    pattern: String,
    has_time: bool,
}

fn compile(template: &str) -> CompiledTemplate {
    let template = if template.trim().is_empty() {
        DEFAULT_DATE_FORMAT
    } else {
        template
    };

    let mut pattern = String::with_capacity(template.len() * 2);
    let mut has_time = false;
    let mut rest = template;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '\'' {
            // 'quoted literal', with '' standing for a single quote
            let after = &rest[1..];
            if let Some(stripped) = after.strip_prefix('\'') {
                pattern.push('\'');
                rest = stripped;
                continue;
            }
            let end = after.find('\'').unwrap_or(after.len());
            push_literal(&mut pattern, &after[..end]);
            rest = after.get(end + 1..).unwrap_or("");
            continue;
        }

        for (token, item, is_time) in TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                pattern.push_str(item);
                has_time |= is_time;
                rest = stripped;
                continue 'outer;
            }
        }

        push_literal(&mut pattern, &rest[..ch.len_utf8()]);
        rest = &rest[ch.len_utf8()..];
    }

    CompiledTemplate { pattern, has_time }
}

fn push_literal(pattern: &mut String, literal: &str) {
    for ch in literal.chars() {
        if ch == '%' {
            pattern.push_str("%%");
        } else {
            pattern.push(ch);
        }
    }
}

/// 12-hour clock rendering used when the template carries no time tokens.
pub fn twelve_hour(time: NaiveTime) -> String {
    let hour = time.hour();
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{:02}:{:02} {}", display_hour, time.minute(), suffix)
}

/// Render `raw` through `template` if it is date-like.
///
/// Returns `None` when `raw` is not a date or the template cannot be rendered, in
/// which case callers show the raw string instead.
pub fn format_date_like(raw: &str, template: &str) -> Option<String> {
    let parsed = parse_date_like(raw)?;
    let compiled = compile(template);
    let moment = NaiveDateTime::new(parsed.date, parsed.time.unwrap_or(NaiveTime::MIN));

    let mut out = String::new();
    write!(out, "{}", moment.format(&compiled.pattern)).ok()?;

    if let Some(time) = parsed.time {
        if !compiled.has_time {
            out.push(' ');
            out.push_str(&twelve_hour(time));
        }
    }
    Some(out)
}
