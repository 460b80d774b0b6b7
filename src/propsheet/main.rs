use clap::Parser;
use colored::*;
use propsheet::api::{CmdMessage, CmdResult, ConfigAction, MessageLevel, PropsFormat, PropsheetApi};
use propsheet::error::Result;
use propsheet::host::ViewMode;
use propsheet::settings::SETTING_KEYS;
use propsheet::store::fs::FileStore;
use std::fs;
use std::path::{Path, PathBuf};

mod args;
use args::{Cli, Commands};

const SETTINGS_DIR: &str = ".propsheet";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let vault = cli.vault.unwrap_or_else(default_vault);
    let store = FileStore::new(vault.clone());
    let mut api = PropsheetApi::new(store, vault.join(SETTINGS_DIR))?;

    match cli.command {
        Commands::Preview { document, output } => {
            let result = api.preview(&document)?;
            let page = result.rendered.clone().unwrap_or_default();
            handle_page(&page, output.as_deref(), &result)
        }
        Commands::Print {
            document,
            output,
            source_mode,
        } => {
            let result = api.print(&document, view_mode(source_mode))?;
            handle_pages(&result, output.as_deref())
        }
        Commands::Export {
            document,
            output,
            source_mode,
        } => {
            let result = api.export(&document, view_mode(source_mode))?;
            handle_pages(&result, output.as_deref())
        }
        Commands::Props { document, markdown } => {
            let format = if markdown {
                PropsFormat::Markdown
            } else {
                PropsFormat::Html
            };
            let result = api.properties(&document, format)?;
            if let Some(rendered) = &result.rendered {
                print!("{}", rendered);
                if !rendered.ends_with('\n') {
                    println!();
                }
            }
            print_messages(&result.messages);
            Ok(())
        }
        Commands::List => handle_list(&api),
        Commands::Config { key, value } => handle_config(&mut api, key, value),
    }
}

fn view_mode(source_mode: bool) -> ViewMode {
    if source_mode {
        ViewMode::Source
    } else {
        ViewMode::Preview
    }
}

fn handle_pages(result: &CmdResult, output: Option<&Path>) -> Result<()> {
    for page in &result.pages {
        handle_page(&page.html, output, result)?;
    }
    Ok(())
}

/// Write `html` to `output`, or to stdout with messages moved to stderr.
fn handle_page(html: &str, output: Option<&Path>, result: &CmdResult) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, html)?;
            print_messages(&result.messages);
            print_messages(&[CmdMessage::info(format!("Wrote {}", path.display()))]);
        }
        None => {
            println!("{}", html);
            for message in &result.messages {
                eprintln!("{}", styled(message));
            }
        }
    }
    Ok(())
}

fn handle_list(api: &PropsheetApi) -> Result<()> {
    let result = api.list()?;
    for doc in &result.documents {
        let count = match doc.visible_properties {
            1 => "1 property".to_string(),
            n => format!("{} properties", n),
        };
        println!("{}  {}", doc.path, count.dimmed());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(api: &mut PropsheetApi, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = api.config(action)?;
    if show_all {
        if let Some(settings) = &result.settings {
            for key in SETTING_KEYS {
                let value = settings.get(key)?;
                println!("{} = {}", key, value);
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn styled(message: &CmdMessage) -> ColoredString {
    match message.level {
        MessageLevel::Info => message.content.dimmed(),
        MessageLevel::Success => message.content.green(),
        MessageLevel::Warning => message.content.yellow(),
        MessageLevel::Error => message.content.red(),
    }
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", styled(message));
    }
}

fn default_vault() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
