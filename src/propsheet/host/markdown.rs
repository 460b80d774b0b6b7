//! Markdown rendering into an isolated DOM, with post-processor hooks.
//!
//! Every render produces a fresh document:
//!
//! ```text
//! <html><head>…styles…</head><body>
//!   <div class="markdown-preview-view markdown-rendered [print]">
//!     <div class="markdown-preview-sizer">…rendered body…</div>
//!   </div>
//! </body></html>
//! ```
//!
//! Post-processors run once per render with the view element and a
//! [`RenderContext`] naming the source document and its frontmatter.

use super::events::{ListenerId, Listeners};
use crate::format::escape_html;
use crate::inject::RenderTarget;
use crate::metadata::{read_properties, split_frontmatter};
use crate::model::{DocPath, PropertyMap};
use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use pulldown_cmark::{html, Options, Parser};
use std::rc::Rc;

pub const VIEW_CLASS: &str = "markdown-preview-view";
pub const PRINT_CLASS: &str = "print";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Live preview shown in a workspace view.
    Preview,
    /// Page laid out for the print dialog.
    Print,
    /// Isolated page built by the export pipeline.
    Export,
}

impl RenderKind {
    fn classes(self) -> &'static str {
        match self {
            RenderKind::Preview => "markdown-preview-view markdown-rendered",
            RenderKind::Print | RenderKind::Export => "markdown-preview-view markdown-rendered print",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub source_path: DocPath,
    pub frontmatter: Option<PropertyMap>,
}

pub type PostProcessor = dyn Fn(&NodeRef, &RenderContext);

#[derive(Default)]
pub struct MarkdownRenderer {
    post_processors: Listeners<PostProcessor>,
    styles: Listeners<str>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_post_processor(&mut self, processor: Rc<PostProcessor>) -> ListenerId {
        self.post_processors.on(processor)
    }

    pub fn unregister_post_processor(&mut self, id: ListenerId) -> bool {
        self.post_processors.off(id)
    }

    /// Add a stylesheet to every page rendered from now on.
    pub fn register_style(&mut self, css: &str) -> ListenerId {
        self.styles.on(Rc::from(css))
    }

    pub fn unregister_style(&mut self, id: ListenerId) -> bool {
        self.styles.off(id)
    }

    pub fn render(&self, source_path: &str, text: &str, kind: RenderKind) -> RenderTarget {
        let split = split_frontmatter(text);
        let body = markdown_to_html(split.body);
        let styles: String = self.styles.snapshot().iter().map(|css| &**css).collect();

        let page = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\
             <body><div class=\"{}\"><div class=\"markdown-preview-sizer\">{}</div></div></body></html>",
            escape_html(&page_title(source_path)),
            styles,
            kind.classes(),
            body
        );

        let document = kuchiki::parse_html().one(page);
        let container = document
            .select_first(&format!(".{}", VIEW_CLASS))
            .map(|view| view.as_node().clone())
            .ok();

        let ctx = RenderContext {
            source_path: source_path.to_string(),
            frontmatter: read_properties(text),
        };
        if let Some(container) = &container {
            for processor in self.post_processors.snapshot() {
                processor(container, &ctx);
            }
        }

        match container {
            Some(container) => RenderTarget::new(document, container),
            None => RenderTarget::document_only(document),
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn page_title(source_path: &str) -> String {
    let file = source_path.rsplit('/').next().unwrap_or(source_path);
    file.strip_suffix(".md").unwrap_or(file).to_string()
}
