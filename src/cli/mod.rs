//! CLI module for paperscope
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `backends` - List configured analysis backends
//! - `health` - Probe every enabled backend
//! - `analyze` - Summarize a paper
//! - `chat` - Ask a question about a paper
//! - `authors` - Profile a paper's authors
//! - `markdown` - Fetch extracted markdown for a paper
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Which backend would be used right now?
//! paperscope health
//!
//! # Summarize a paper without probing
//! paperscope analyze --title "Attention Is All You Need" --abstract "..." --fast
//!
//! # Generate shell completions
//! paperscope completions bash > ~/.bash_completion.d/paperscope
//! ```

pub mod analyze;
pub mod backends;
pub mod completions;
pub mod config;
pub mod health;
pub mod output;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::{ConfigError, PaperscopeConfig};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// paperscope - academic paper analysis client
#[derive(Parser, Debug)]
#[command(
    name = "paperscope",
    version,
    about = "Client for paper analysis backends with health-checked failover"
)]
pub struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "PAPERSCOPE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect configured backends
    #[command(subcommand)]
    Backends(BackendsCommands),
    /// Probe every enabled backend
    Health(HealthArgs),
    /// Summarize a paper
    Analyze(AnalyzeArgs),
    /// Ask a question about a paper
    Chat(ChatArgs),
    /// Profile the authors of a paper
    Authors(AuthorsArgs),
    /// Fetch extracted markdown for an uploaded paper
    Markdown(MarkdownArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Configuration file the command reads, if any.
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Backends(BackendsCommands::List(args)) => Some(&args.config),
            Commands::Health(args) => Some(&args.config),
            Commands::Analyze(args) => Some(&args.config),
            Commands::Chat(args) => Some(&args.config),
            Commands::Authors(args) => Some(&args.config),
            Commands::Markdown(args) => Some(&args.config),
            Commands::Config(_) | Commands::Completions(_) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum BackendsCommands {
    /// List candidate backends in selection order
    List(BackendsListArgs),
}

#[derive(Args, Debug)]
pub struct BackendsListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Include disabled backends
    #[arg(short, long)]
    pub all: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Paper title
    #[arg(short, long)]
    pub title: String,

    /// Paper abstract
    #[arg(short, long = "abstract")]
    pub abstract_text: String,

    /// Page the paper was found on
    #[arg(short, long)]
    pub url: Option<String>,

    /// Backend-assigned paper id
    #[arg(long)]
    pub paper_id: Option<String>,

    /// Use the top-priority backend without probing (no failover)
    #[arg(long)]
    pub fast: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Question to ask
    pub message: String,

    /// Paper title
    #[arg(short, long)]
    pub title: String,

    /// Paper abstract
    #[arg(short, long = "abstract")]
    pub abstract_text: String,

    /// Previous summary of the paper
    #[arg(short, long, default_value = "")]
    pub summary: String,

    /// Use the top-priority backend without probing (no failover)
    #[arg(long)]
    pub fast: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct AuthorsArgs {
    /// Author name (repeatable)
    #[arg(long = "author", required = true)]
    pub authors: Vec<String>,

    /// Affiliation (repeatable)
    #[arg(long = "affiliation")]
    pub affiliations: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct MarkdownArgs {
    /// Paper id returned by the backend
    pub paper_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "paperscope.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "paperscope.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration for a command.
///
/// A missing file means defaults; a file that exists but does not parse or
/// validate is an error. Environment overrides and `--log-level` are applied
/// on top.
pub fn load_config(
    path: &Path,
    log_level: Option<&str>,
) -> Result<PaperscopeConfig, ConfigError> {
    let config = match PaperscopeConfig::load(Some(path)) {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => PaperscopeConfig::default(),
        Err(e) => return Err(e),
    };

    let mut config = config.with_env_overrides();
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_backends_list_defaults() {
        let cli = Cli::try_parse_from(["paperscope", "backends", "list"]).unwrap();
        match cli.command {
            Commands::Backends(BackendsCommands::List(args)) => {
                assert_eq!(args.config, PathBuf::from("paperscope.toml"));
                assert!(!args.json);
                assert!(!args.all);
            }
            _ => panic!("Expected Backends List command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze() {
        let cli = Cli::try_parse_from([
            "paperscope",
            "analyze",
            "--title",
            "T",
            "--abstract",
            "A",
            "--fast",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.title, "T");
                assert_eq!(args.abstract_text, "A");
                assert!(args.fast);
                assert!(args.url.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_requires_title() {
        assert!(Cli::try_parse_from(["paperscope", "analyze", "--abstract", "A"]).is_err());
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::try_parse_from([
            "paperscope",
            "chat",
            "What is the main result?",
            "-t",
            "T",
            "-a",
            "A",
        ])
        .unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.message, "What is the main result?");
                assert_eq!(args.summary, "");
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_parse_authors_repeatable() {
        let cli = Cli::try_parse_from([
            "paperscope",
            "authors",
            "--author",
            "Ada",
            "--author",
            "Alan",
            "--affiliation",
            "Cambridge",
        ])
        .unwrap();
        match cli.command {
            Commands::Authors(args) => {
                assert_eq!(args.authors, vec!["Ada", "Alan"]);
                assert_eq!(args.affiliations, vec!["Cambridge"]);
            }
            _ => panic!("Expected Authors command"),
        }
    }

    #[test]
    fn test_cli_global_log_level() {
        let cli = Cli::try_parse_from(["paperscope", "health", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.command.config_path().is_some());
    }

    #[test]
    fn test_config_commands_have_no_config_path() {
        let cli = Cli::try_parse_from(["paperscope", "config", "init"]).unwrap();
        assert!(cli.command.config_path().is_none());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/paperscope.toml"), Some("info")).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.backends.len(), 1);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[failure]\nthreshold = 0").unwrap();
        let result = load_config(temp.path(), None);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }
}
