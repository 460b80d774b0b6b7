//! # Trigger Coordinator
//!
//! Decides *when* the properties block goes into rendered output and when it
//! comes out again. Each print or export runs one cycle:
//!
//! ```text
//! Idle ──begin──▶ Injected ──end──▶ Idle
//! ```
//!
//! ## Triggers
//!
//! | Trigger          | Enters via                         | Leaves via                   |
//! |------------------|------------------------------------|------------------------------|
//! | render hook      | post-processor on a printable view | never (next render replaces) |
//! | print command    | wrapper around `editor:print`      | same wrapper, after delegate |
//! | export command   | wrapper around `workspace:export-pdf` | same wrapper, after delegate |
//! | before print     | host `before_print` notification   | host `after_print`           |
//!
//! Command triggers are middleware: [`TriggerCoordinator::load`] swaps each
//! targeted action for a wrapper that owns the original, and
//! [`TriggerCoordinator::unload`] puts the originals back. Ids the host does not
//! register are left alone.
//!
//! ## DOM first, text second
//!
//! When a trigger can name a live render target, the HTML fragment is injected
//! into it. When it cannot (source-mode print, the export pipeline before it has
//! built its page), the markdown rendition is patched into the document text
//! and the original is kept in the session's [`FileBackups`] until the cycle
//! ends. While a document is patched, the render hook leaves its views alone:
//! the text already carries the block.
//!
//! A cycle only takes out what it put in. A block the render hook left in a
//! live view stays there after a print or export.
//!
//! ## Failures
//!
//! Nothing raised while injecting, patching, removing or restoring leaves a
//! trigger; it is logged and the cycle carries on. The paired end step runs even
//! when the delegated action fails or panics. A delegated error is handed back
//! to the caller after cleanup, a panic is resumed after cleanup.

use crate::format::ValueFormatter;
use crate::host::events::ListenerId;
use crate::host::markdown::{RenderContext, PRINT_CLASS, VIEW_CLASS};
use crate::host::{Action, Host, PrintEvent, EXPORT_PDF_COMMAND, PRINT_COMMAND};
use crate::inject::{self, InjectOutcome, Injector, RenderTarget};
use crate::metadata::read_properties;
use crate::model::DocPath;
use crate::patch::{self, FileBackups, PatchOutcome};
use crate::render::{render, render_markdown, BLOCK_STYLE};
use crate::settings::Settings;
use crate::store::DocumentStore;
use kuchiki::NodeRef;
use log::{debug, warn};
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RenderHook,
    PrintCommand,
    ExportCommand,
    BeforePrint,
    AfterPrint,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::RenderHook => "render hook",
            Trigger::PrintCommand => "print command",
            Trigger::ExportCommand => "export command",
            Trigger::BeforePrint => "before print",
            Trigger::AfterPrint => "after print",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Injected,
}

/// Everything the triggers share, created on load and cleared on unload.
#[derive(Debug, Default)]
pub struct Session {
    settings: Settings,
    current_document: Option<DocPath>,
    backups: FileBackups,
    open_cycles: usize,
    /// Targets a cycle inserted a block into, until that cycle ends.
    injected: Vec<RenderTarget>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Last document reported as opened.
    pub fn current_document(&self) -> Option<&str> {
        self.current_document.as_deref()
    }

    pub fn backups(&self) -> &FileBackups {
        &self.backups
    }

    pub fn state(&self) -> CycleState {
        if self.open_cycles > 0 {
            CycleState::Injected
        } else {
            CycleState::Idle
        }
    }

    fn formatter(&self) -> ValueFormatter {
        ValueFormatter::new(self.settings.date_format.as_str())
    }

    fn injector(&self) -> Injector {
        Injector::new(self.settings.insert_after_heading)
    }

    /// Render hook: decorate a freshly rendered view from its frontmatter.
    fn decorate_render(&self, element: &NodeRef, ctx: &RenderContext) {
        if !self.settings.display_properties {
            return;
        }
        if self.backups.contains(&ctx.source_path) {
            debug!(
                "{}: {} is patched, leaving its view alone",
                Trigger::RenderHook,
                ctx.source_path
            );
            return;
        }
        let Some(properties) = &ctx.frontmatter else {
            return;
        };

        let fragment = render(properties, &self.settings.excluded_names(), &self.formatter());
        let outcome = self
            .injector()
            .inject(&RenderTarget::container_only(element.clone()), fragment.as_ref());
        debug!("{}: {} -> {:?}", Trigger::RenderHook, ctx.source_path, outcome);
    }

    /// Idle → Injected.
    fn begin(
        &mut self,
        store: &mut dyn DocumentStore,
        path: Option<&str>,
        target: Option<&RenderTarget>,
        trigger: Trigger,
    ) {
        self.open_cycles += 1;

        if !self.settings.display_properties {
            debug!("{}: properties display is off", trigger);
            return;
        }
        let Some(path) = path else {
            debug!("{}: no document to decorate", trigger);
            return;
        };

        match target {
            Some(_) if self.backups.contains(path) => {
                debug!("{}: {} is already patched", trigger, path);
            }
            Some(target) => self.inject_from_store(&*store, path, target, trigger),
            None => self.patch_document(store, path, trigger),
        }
    }

    /// Injected → Idle. Undoes only what a `begin` put in.
    fn end(
        &mut self,
        store: &mut dyn DocumentStore,
        path: Option<&str>,
        target: Option<&RenderTarget>,
        trigger: Trigger,
    ) {
        self.open_cycles = self.open_cycles.saturating_sub(1);

        if let Some(target) = target {
            if let Some(idx) = self.injected.iter().position(|t| t.same_nodes(target)) {
                self.injected.swap_remove(idx);
                inject::remove(target);
            }
        }
        if let Some(path) = path {
            // A failed restore is logged by the patch module.
            if let Ok(true) = patch::restore(store, &mut self.backups, path) {
                debug!("{}: restored {}", trigger, path);
            }
        }
    }

    fn inject_from_store(
        &mut self,
        store: &dyn DocumentStore,
        path: &str,
        target: &RenderTarget,
        trigger: Trigger,
    ) {
        let properties = match store.read_text(path) {
            Ok(text) => read_properties(&text),
            Err(e) => {
                warn!("{}: cannot read {}: {}", trigger, path, e);
                return;
            }
        };
        let fragment = properties
            .and_then(|p| render(&p, &self.settings.excluded_names(), &self.formatter()));
        let outcome = self.injector().inject(target, fragment.as_ref());
        debug!("{}: {} -> {:?}", trigger, path, outcome);
        if matches!(outcome, InjectOutcome::Inserted { .. }) {
            self.injected.push(target.clone());
        }
    }

    fn patch_document(&mut self, store: &mut dyn DocumentStore, path: &str, trigger: Trigger) {
        if self.backups.contains(path) {
            debug!("{}: {} is already patched", trigger, path);
            return;
        }

        let text = match store.read_text(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("{}: cannot read {}: {}", trigger, path, e);
                return;
            }
        };
        let Some(block) = read_properties(&text)
            .and_then(|p| render_markdown(&p, &self.settings.excluded_names(), &self.formatter()))
        else {
            debug!("{}: nothing to show for {}", trigger, path);
            return;
        };

        let after_heading = self.settings.insert_after_heading;
        match patch::apply(store, &mut self.backups, path, &block, after_heading) {
            Ok(PatchOutcome::Patched) => debug!("{}: patched {}", trigger, path),
            Ok(PatchOutcome::AlreadyPatched) => {}
            Err(e) => warn!("{}: patch fallback for {} failed: {}", trigger, path, e),
        }
    }

    /// Write every outstanding backup back.
    fn restore_all(&mut self, store: &mut dyn DocumentStore) {
        for path in self.backups.paths() {
            if let Ok(true) = patch::restore(&mut *store, &mut self.backups, &path) {
                debug!("Restored {} on unload", path);
            }
        }
    }
}

/// Run `f` on the session unless another trigger holds it.
fn with_session(session: &RefCell<Session>, trigger: Trigger, f: impl FnOnce(&mut Session)) {
    match session.try_borrow_mut() {
        Ok(mut session) => f(&mut session),
        Err(_) => warn!("{}: session busy, skipping", trigger),
    }
}

fn is_printable(element: &NodeRef) -> bool {
    element
        .as_element()
        .and_then(|e| {
            e.attributes.borrow().get("class").map(|classes| {
                classes
                    .split_whitespace()
                    .any(|class| class == VIEW_CLASS || class == PRINT_CLASS)
            })
        })
        .unwrap_or(false)
}

/// Compose `original` with a begin/end cycle.
fn intercept(session: Rc<RefCell<Session>>, original: Action, trigger: Trigger) -> Action {
    Rc::new(move |host: &mut Host| {
        let path = host.workspace.active().map(str::to_string).or_else(|| {
            session
                .try_borrow()
                .ok()
                .and_then(|s| s.current_document.clone())
        });
        let target = path
            .as_deref()
            .and_then(|p| host.workspace.view(p).cloned());

        with_session(&session, trigger, |s| {
            s.begin(&mut *host.store, path.as_deref(), target.as_ref(), trigger)
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| original(&mut *host)));

        with_session(&session, trigger, |s| {
            s.end(&mut *host.store, path.as_deref(), target.as_ref(), trigger)
        });

        match outcome {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!("{}: delegated action failed: {}", trigger, e);
                }
                result
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

struct Hooks {
    post_processor: ListenerId,
    document_opened: ListenerId,
    before_print: ListenerId,
    after_print: ListenerId,
    style: ListenerId,
    intercepted: Vec<(&'static str, Action)>,
}

pub struct TriggerCoordinator {
    session: Rc<RefCell<Session>>,
    hooks: Option<Hooks>,
}

impl TriggerCoordinator {
    pub fn new(settings: Settings) -> Self {
        Self {
            session: Rc::new(RefCell::new(Session::new(settings))),
            hooks: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.hooks.is_some()
    }

    pub fn settings(&self) -> Settings {
        self.session.borrow().settings.clone()
    }

    /// Takes effect for the next trigger.
    pub fn update_settings(&self, settings: Settings) {
        self.session.borrow_mut().settings = settings;
    }

    pub fn state(&self) -> CycleState {
        self.session.borrow().state()
    }

    pub fn current_document(&self) -> Option<DocPath> {
        self.session.borrow().current_document.clone()
    }

    pub fn outstanding_backups(&self) -> Vec<DocPath> {
        self.session.borrow().backups.paths()
    }

    /// Hook into `host`. Loading twice is a no-op.
    pub fn load(&mut self, host: &mut Host) {
        if self.hooks.is_some() {
            return;
        }

        let session = Rc::clone(&self.session);
        let post_processor =
            host.renderer
                .register_post_processor(Rc::new(move |element: &NodeRef, ctx: &RenderContext| {
                    if !is_printable(element) {
                        return;
                    }
                    match session.try_borrow() {
                        Ok(session) => session.decorate_render(element, ctx),
                        Err(_) => warn!("{}: session busy, skipping", Trigger::RenderHook),
                    }
                }));

        let session = Rc::clone(&self.session);
        let document_opened = host.workspace.on_document_opened(Rc::new(move |path: &str| {
            if let Ok(mut session) = session.try_borrow_mut() {
                session.current_document = Some(path.to_string());
            }
        }));

        let session = Rc::clone(&self.session);
        let before_print = host.print.on_before_print(Rc::new(
            move |store: &mut dyn DocumentStore, event: &PrintEvent| {
                with_session(&session, Trigger::BeforePrint, |s| {
                    let path = event.document.clone().or_else(|| s.current_document.clone());
                    s.begin(store, path.as_deref(), event.target.as_ref(), Trigger::BeforePrint)
                })
            },
        ));

        let session = Rc::clone(&self.session);
        let after_print = host.print.on_after_print(Rc::new(
            move |store: &mut dyn DocumentStore, event: &PrintEvent| {
                with_session(&session, Trigger::AfterPrint, |s| {
                    let path = event.document.clone().or_else(|| s.current_document.clone());
                    s.end(store, path.as_deref(), event.target.as_ref(), Trigger::AfterPrint)
                })
            },
        ));

        let style = host.renderer.register_style(BLOCK_STYLE);

        let mut intercepted = Vec::new();
        for (id, trigger) in [
            (PRINT_COMMAND, Trigger::PrintCommand),
            (EXPORT_PDF_COMMAND, Trigger::ExportCommand),
        ] {
            let Some(original) = host.commands.get(id) else {
                debug!("{} is not registered, not intercepting", id);
                continue;
            };
            let wrapped = intercept(Rc::clone(&self.session), Rc::clone(&original), trigger);
            host.commands.replace(id, wrapped);
            intercepted.push((id, original));
        }

        debug!("Loaded, intercepting {} command(s)", intercepted.len());
        self.hooks = Some(Hooks {
            post_processor,
            document_opened,
            before_print,
            after_print,
            style,
            intercepted,
        });
    }

    /// Undo [`load`](Self::load): originals back in the command table, listeners
    /// gone, outstanding backups restored, session cleared.
    pub fn unload(&mut self, host: &mut Host) {
        let Some(hooks) = self.hooks.take() else {
            return;
        };

        for (id, original) in hooks.intercepted {
            if host.commands.replace(id, original).is_none() {
                debug!("{} disappeared while intercepted", id);
            }
        }
        host.renderer.unregister_post_processor(hooks.post_processor);
        host.renderer.unregister_style(hooks.style);
        host.workspace.off_document_opened(hooks.document_opened);
        host.print.off_before_print(hooks.before_print);
        host.print.off_after_print(hooks.after_print);

        let mut session = self.session.borrow_mut();
        session.restore_all(&mut *host.store);
        let settings = std::mem::take(&mut session.settings);
        *session = Session::new(settings);
        debug!("Unloaded");
    }
}
