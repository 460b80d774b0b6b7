//! # Settings
//!
//! Settings live in `<vault>/.propsheet/settings.json`. Keys that are missing from
//! the file fall back to the compiled defaults, so older files keep loading after
//! new settings are added.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `displayProperties` | `true` | Master switch for every trigger |
//! | `excludedProperties` | `""` | Comma separated names never shown (case-sensitive) |
//! | `insertAfterHeading` | `false` | Place the block after the first `h1` |
//! | `dateFormat` | `yyyy-MM-dd` | Template for date-like values |

use crate::error::{PropsheetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const SETTINGS_FILENAME: &str = "settings.json";
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// The keys accepted by [`Settings::get`] and [`Settings::set`].
pub const SETTING_KEYS: &[&str] = &[
    "display-properties",
    "excluded-properties",
    "insert-after-heading",
    "date-format",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub display_properties: bool,
    pub excluded_properties: String,
    pub insert_after_heading: bool,
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_properties: true,
            excluded_properties: String::new(),
            insert_after_heading: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(settings_dir: P) -> Result<Self> {
        let settings_path = settings_dir.as_ref().join(SETTINGS_FILENAME);

        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&settings_path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to the given directory
    pub fn save<P: AsRef<Path>>(&self, settings_dir: P) -> Result<()> {
        let settings_dir = settings_dir.as_ref();

        if !settings_dir.exists() {
            fs::create_dir_all(settings_dir)?;
        }

        let settings_path = settings_dir.join(SETTINGS_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(settings_path, content)?;
        Ok(())
    }

    /// The excluded property names, trimmed, empties dropped.
    pub fn excluded_names(&self) -> BTreeSet<String> {
        self.excluded_properties
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "display-properties" => Ok(self.display_properties.to_string()),
            "excluded-properties" => Ok(self.excluded_properties.clone()),
            "insert-after-heading" => Ok(self.insert_after_heading.to_string()),
            "date-format" => Ok(self.date_format.clone()),
            other => Err(unknown_key(other)),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "display-properties" => self.display_properties = parse_flag(key, value)?,
            "excluded-properties" => self.excluded_properties = value.to_string(),
            "insert-after-heading" => self.insert_after_heading = parse_flag(key, value)?,
            "date-format" => {
                let format = value.trim();
                self.date_format = if format.is_empty() {
                    DEFAULT_DATE_FORMAT.to_string()
                } else {
                    format.to_string()
                };
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(PropsheetError::Settings(format!(
            "{} expects true or false, got '{}'",
            key, value
        ))),
    }
}

fn unknown_key(key: &str) -> PropsheetError {
    PropsheetError::Settings(format!(
        "Unknown setting '{}' (expected one of: {})",
        key,
        SETTING_KEYS.join(", ")
    ))
}
