use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds.
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "propsheet", bin_name = "propsheet", version = version())]
#[command(about = "Show frontmatter properties in printed and exported markdown", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory holding the documents (defaults to the current directory)
    #[arg(long, global = true, env = "PROPSHEET_VAULT")]
    pub vault: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a document in live preview
    #[command(alias = "p")]
    Preview {
        /// Document path, relative to the vault
        document: String,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a document through the print command
    Print {
        /// Document path, relative to the vault
        document: String,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the document in source mode (no live view)
        #[arg(long)]
        source_mode: bool,
    },

    /// Export a document through the export-to-PDF command
    #[command(alias = "x")]
    Export {
        /// Document path, relative to the vault
        document: String,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the document in source mode (no live view)
        #[arg(long)]
        source_mode: bool,
    },

    /// Show the properties block of a document
    Props {
        /// Document path, relative to the vault
        document: String,

        /// Show the markdown table used when patching document text
        #[arg(long)]
        markdown: bool,
    },

    /// List documents and how many properties each shows
    #[command(alias = "ls")]
    List,

    /// Get or set configuration
    Config {
        /// Setting key (e.g., excluded-properties)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_print_flags() {
        let cli = Cli::try_parse_from([
            "propsheet",
            "--vault",
            "/tmp/vault",
            "print",
            "notes/a.md",
            "--source-mode",
            "-o",
            "out.html",
        ])
        .unwrap();

        assert_eq!(cli.vault, Some(PathBuf::from("/tmp/vault")));
        match cli.command {
            Commands::Print {
                document,
                output,
                source_mode,
            } => {
                assert_eq!(document, "notes/a.md");
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert!(source_mode);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_arguments_are_optional() {
        let cli = Cli::try_parse_from(["propsheet", "config"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                key: None,
                value: None
            }
        ));
    }

    #[test]
    fn test_document_is_required() {
        assert!(Cli::try_parse_from(["propsheet", "preview"]).is_err());
    }
}
