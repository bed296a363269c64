//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Run the extraction parsers over a directory tree and
//!   write the resulting gettext template
//! - `parsers`: List available parsers and their capabilities
//! - `init`: Initialize a potx configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ParserKind {
    Php,
    BlockTemplates,
}

impl ParserKind {
    pub fn name(self) -> &'static str {
        match self {
            ParserKind::Php => "php",
            ParserKind::BlockTemplates => "block-templates",
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Directory to extract from
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Template output path, "-" for stdout (overrides config file)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Prefix prepended to every recorded source reference
    #[arg(long, default_value = "")]
    pub relative_path: String,

    /// Scan vendor and 3rdparty directories too
    #[arg(long)]
    pub include_vendor: bool,

    /// Parsers to run (default: from config file)
    /// Can be specified multiple times: --parser php --parser block-templates
    #[arg(long = "parser", value_enum)]
    pub parsers: Vec<ParserKind>,

    /// Never invoke xgettext, use the built-in scanner only
    #[arg(long)]
    pub builtin_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings into a gettext template file
    Extract(ExtractCommand),
    /// List available parsers and their capabilities
    Parsers,
    /// Initialize a new .potxrc.json configuration file
    Init,
}
