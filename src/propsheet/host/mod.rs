//! # Host Environment
//!
//! The application the properties block is injected into. It owns the pieces
//! the trigger coordinator hooks into:
//!
//! - a [`DocumentStore`] for document text,
//! - a [`Workspace`] tracking the active document and its live preview views,
//! - a [`MarkdownRenderer`] whose post-processors form the render hook,
//! - a [`CommandRegistry`] with the built-in `editor:print` and
//!   `workspace:export-pdf` actions,
//! - the print lifecycle (`before_print` / `after_print` listeners).
//!
//! Printed and exported pages land in the [`Host::outbox`]; writing them to disk
//! (or handing them to a PDF backend) is up to the caller.
//!
//! ## Built-in actions
//!
//! `editor:print` emits `before_print` with the active document's live view as
//! target, or with no target when the document is not open in preview. Without a
//! view it then lays the page out from the document text as it is *after* the
//! `before_print` listeners ran. The page is captured before `after_print` fires.
//!
//! `workspace:export-pdf` always renders the document text into a fresh, isolated
//! page; no DOM exists before the action runs.

pub mod events;
pub mod markdown;

use crate::error::{PropsheetError, Result};
use crate::inject::RenderTarget;
use crate::metadata::read_properties;
use crate::model::{normalize_path, DocPath, PropertyMap};
use crate::store::DocumentStore;
use events::{ListenerId, Listeners};
use log::debug;
use markdown::{MarkdownRenderer, RenderKind};
use std::collections::BTreeMap;
use std::rc::Rc;

pub const PRINT_COMMAND: &str = "editor:print";
pub const EXPORT_PDF_COMMAND: &str = "workspace:export-pdf";

/// An invocable command.
pub type Action = Rc<dyn Fn(&mut Host) -> Result<()>>;

pub type DocumentOpenedListener = dyn Fn(&str);

pub type PrintListener = dyn Fn(&mut dyn DocumentStore, &PrintEvent);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Preview,
    Source,
}

/// Payload of the print lifecycle notifications.
#[derive(Debug, Clone)]
pub struct PrintEvent {
    pub document: Option<DocPath>,
    pub target: Option<RenderTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Print,
    Export,
}

/// A page produced by the print or export pipeline.
#[derive(Debug, Clone)]
pub struct PrintedPage {
    pub path: DocPath,
    pub kind: OutputKind,
    pub html: String,
}

#[derive(Default)]
pub struct Workspace {
    active: Option<DocPath>,
    views: BTreeMap<DocPath, RenderTarget>,
    opened: Listeners<DocumentOpenedListener>,
}

impl Workspace {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The live preview view of `path`, if it is open in preview mode.
    pub fn view(&self, path: &str) -> Option<&RenderTarget> {
        self.views.get(&normalize_path(path))
    }

    pub fn on_document_opened(&mut self, listener: Rc<DocumentOpenedListener>) -> ListenerId {
        self.opened.on(listener)
    }

    pub fn off_document_opened(&mut self, id: ListenerId) -> bool {
        self.opened.off(id)
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Action>,
}

impl CommandRegistry {
    pub fn register(&mut self, id: &str, action: Action) {
        self.commands.insert(id.to_string(), action);
    }

    pub fn get(&self, id: &str) -> Option<Action> {
        self.commands.get(id).cloned()
    }

    /// Swap the action behind an existing id. Returns the previous action, or
    /// `None` (and changes nothing) when the id is not registered.
    pub fn replace(&mut self, id: &str, action: Action) -> Option<Action> {
        let slot = self.commands.get_mut(id)?;
        Some(std::mem::replace(slot, action))
    }

    pub fn unregister(&mut self, id: &str) -> Option<Action> {
        self.commands.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }
}

#[derive(Default)]
pub struct PrintLifecycle {
    before: Listeners<PrintListener>,
    after: Listeners<PrintListener>,
}

impl PrintLifecycle {
    pub fn on_before_print(&mut self, listener: Rc<PrintListener>) -> ListenerId {
        self.before.on(listener)
    }

    pub fn on_after_print(&mut self, listener: Rc<PrintListener>) -> ListenerId {
        self.after.on(listener)
    }

    pub fn off_before_print(&mut self, id: ListenerId) -> bool {
        self.before.off(id)
    }

    pub fn off_after_print(&mut self, id: ListenerId) -> bool {
        self.after.off(id)
    }
}

pub struct Host {
    pub store: Box<dyn DocumentStore>,
    pub workspace: Workspace,
    pub commands: CommandRegistry,
    pub renderer: MarkdownRenderer,
    pub print: PrintLifecycle,
    pub outbox: Vec<PrintedPage>,
}

impl Host {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        let mut commands = CommandRegistry::default();
        commands.register(PRINT_COMMAND, Rc::new(print_active_document));
        commands.register(EXPORT_PDF_COMMAND, Rc::new(export_active_document));

        Self {
            store,
            workspace: Workspace::default(),
            commands,
            renderer: MarkdownRenderer::new(),
            print: PrintLifecycle::default(),
            outbox: Vec::new(),
        }
    }

    /// Frontmatter properties of `path`, `None` when it has none.
    pub fn metadata(&self, path: &str) -> Result<Option<PropertyMap>> {
        let text = self.store.read_text(path)?;
        Ok(read_properties(&text))
    }

    /// Make `path` the active document, rendering a live view in preview mode.
    pub fn open_document(&mut self, path: &str, mode: ViewMode) -> Result<()> {
        let path = normalize_path(path);
        if !self.store.exists(&path) {
            return Err(PropsheetError::DocumentNotFound(path));
        }

        match mode {
            ViewMode::Preview => {
                let view = self.render_document(&path, RenderKind::Preview)?;
                self.workspace.views.insert(path.clone(), view);
            }
            ViewMode::Source => {
                self.workspace.views.remove(&path);
            }
        }

        debug!("Opened {} ({:?})", path, mode);
        self.workspace.active = Some(path.clone());
        for listener in self.workspace.opened.snapshot() {
            listener(&path);
        }
        Ok(())
    }

    /// Close the view of `path`; clears the active document if it was active.
    pub fn close_document(&mut self, path: &str) {
        let path = normalize_path(path);
        self.workspace.views.remove(&path);
        if self.workspace.active.as_deref() == Some(path.as_str()) {
            self.workspace.active = None;
        }
    }

    pub fn render_document(&self, path: &str, kind: RenderKind) -> Result<RenderTarget> {
        let text = self.store.read_text(path)?;
        Ok(self.renderer.render(path, &text, kind))
    }

    pub fn execute_command(&mut self, id: &str) -> Result<()> {
        let action = self
            .commands
            .get(id)
            .ok_or_else(|| PropsheetError::UnknownCommand(id.to_string()))?;
        action(self)
    }

    pub fn emit_before_print(&mut self, event: &PrintEvent) {
        for listener in self.print.before.snapshot() {
            listener(&mut *self.store, event);
        }
    }

    pub fn emit_after_print(&mut self, event: &PrintEvent) {
        for listener in self.print.after.snapshot() {
            listener(&mut *self.store, event);
        }
    }

    fn active_document(&self) -> Result<DocPath> {
        self.workspace
            .active()
            .map(str::to_string)
            .ok_or(PropsheetError::NoActiveDocument)
    }
}

fn print_active_document(host: &mut Host) -> Result<()> {
    let path = host.active_document()?;
    let view = host.workspace.view(&path).cloned();

    let event = PrintEvent {
        document: Some(path.clone()),
        target: view.clone(),
    };
    host.emit_before_print(&event);

    let page = match view {
        Some(view) => Ok(view),
        None => host.render_document(&path, RenderKind::Print),
    };
    let captured = page.map(|target| target.to_html());

    host.emit_after_print(&event);

    host.outbox.push(PrintedPage {
        path,
        kind: OutputKind::Print,
        html: captured?,
    });
    Ok(())
}

fn export_active_document(host: &mut Host) -> Result<()> {
    let path = host.active_document()?;
    let page = host.render_document(&path, RenderKind::Export)?;
    host.outbox.push(PrintedPage {
        path,
        kind: OutputKind::Export,
        html: page.to_html(),
    });
    Ok(())
}
