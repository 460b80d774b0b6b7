//! # API Facade
//!
//! [`PropsheetApi`] is the single entry point for every propsheet operation. It
//! owns the [`Host`], the [`TriggerCoordinator`] hooked into it, and the
//! directory the settings live in, and dispatches to `commands/*.rs`.
//!
//! The facade does no formatting and no terminal I/O: it returns
//! [`CmdResult`](commands::CmdResult)s for a UI to present.
//!
//! Dropping the facade unloads the coordinator, so a patched document is never
//! left behind when the process ends normally.

use crate::commands;
use crate::error::Result;
use crate::host::{Host, ViewMode};
use crate::settings::Settings;
use crate::store::DocumentStore;
use crate::trigger::TriggerCoordinator;
use log::debug;
use std::path::{Path, PathBuf};

pub use crate::commands::config::ConfigAction;
pub use crate::commands::properties::PropsFormat;
pub use crate::commands::{CmdMessage, CmdResult, DocumentSummary, MessageLevel};

pub struct PropsheetApi {
    host: Host,
    coordinator: TriggerCoordinator,
    settings_dir: PathBuf,
}

impl PropsheetApi {
    /// Build a host around `store` and load the coordinator with the settings
    /// found in `settings_dir` (defaults when there are none).
    pub fn new<S: DocumentStore + 'static>(store: S, settings_dir: PathBuf) -> Result<Self> {
        let settings = Settings::load(&settings_dir)?;
        debug!("Settings from {}: {:?}", settings_dir.display(), settings);

        let mut host = Host::new(Box::new(store));
        let mut coordinator = TriggerCoordinator::new(settings);
        coordinator.load(&mut host);

        Ok(Self {
            host,
            coordinator,
            settings_dir,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn settings(&self) -> Settings {
        self.coordinator.settings()
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    pub fn preview(&mut self, path: &str) -> Result<CmdResult> {
        commands::preview::run(&mut self.host, path)
    }

    pub fn print(&mut self, path: &str, mode: ViewMode) -> Result<CmdResult> {
        commands::print::run(&mut self.host, path, mode)
    }

    pub fn export(&mut self, path: &str, mode: ViewMode) -> Result<CmdResult> {
        commands::export::run(&mut self.host, path, mode)
    }

    pub fn properties(&self, path: &str, format: PropsFormat) -> Result<CmdResult> {
        commands::properties::run(&*self.host.store, &self.coordinator.settings(), path, format)
    }

    pub fn list(&self) -> Result<CmdResult> {
        commands::list::run(&*self.host.store, &self.coordinator.settings())
    }

    /// Show or change settings. A successful change applies to the next trigger.
    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.settings_dir, action)?;
        if let Some(settings) = &result.settings {
            self.coordinator.update_settings(settings.clone());
        }
        Ok(result)
    }
}

impl Drop for PropsheetApi {
    fn drop(&mut self) {
        self.coordinator.unload(&mut self.host);
    }
}
