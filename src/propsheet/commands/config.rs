use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::Settings;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(settings_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let settings = Settings::load(settings_dir)?;
            Ok(CmdResult::default().with_settings(settings))
        }
        ConfigAction::ShowKey(key) => {
            let settings = Settings::load(settings_dir)?;
            let mut result = CmdResult::default();
            match settings.get(&key) {
                Ok(value) => result.add_message(CmdMessage::info(value)),
                Err(e) => result.add_message(CmdMessage::error(e.to_string())),
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut settings = Settings::load(settings_dir)?;
            if let Err(e) = settings.set(&key, &value) {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::error(e.to_string()));
                return Ok(result);
            }
            settings.save(settings_dir)?;

            let shown = settings.get(&key).unwrap_or(value);
            let mut result = CmdResult::default().with_settings(settings);
            result.add_message(CmdMessage::success(format!("{} set to {}", key, shown)));
            Ok(result)
        }
    }
}
