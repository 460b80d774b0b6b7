use crate::host::PrintedPage;
use crate::settings::Settings;

pub mod config;
pub mod export;
mod helpers;
pub mod list;
pub mod preview;
pub mod print;
pub mod properties;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One document and the number of properties it would show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub path: String,
    pub visible_properties: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub pages: Vec<PrintedPage>,
    pub rendered: Option<String>,
    pub documents: Vec<DocumentSummary>,
    pub settings: Option<Settings>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_pages(mut self, pages: Vec<PrintedPage>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_rendered(mut self, rendered: String) -> Self {
        self.rendered = Some(rendered);
        self
    }

    pub fn with_documents(mut self, documents: Vec<DocumentSummary>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }
}
