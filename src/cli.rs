//! 命令行参数定义

use crate::core::models::{DateSource, OperationMode, Structure};
use clap::builder::PossibleValue;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "sorteo",
    version,
    about = "Organize files into a dated, typed or templated folder tree"
)]
pub struct Cli {
    /// Directory holding config.json and the log file
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort files from ORIGIN into DEST
    Sort(SortArgs),
    /// Show or change saved defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List the built-in file type categories
    Types,
}

#[derive(Debug, Clone, Args)]
pub struct SortArgs {
    /// Folder to sort files from
    pub origin: PathBuf,

    /// Folder to sort files into
    pub destination: PathBuf,

    /// Comma separated extensions, e.g. "pdf, docx, jpg" (defaults to saved file types)
    #[arg(long, short = 't', value_name = "LIST")]
    pub types: Option<String>,

    /// Add every extension of a built-in category (see `sorteo types`)
    #[arg(long = "preset", value_name = "CATEGORY")]
    pub presets: Vec<String>,

    /// Folder structure to create under DEST
    #[arg(long, short = 's', default_value = "year-month")]
    pub structure: Structure,

    /// Topic folder name for topic-year-month and {topic}
    #[arg(long)]
    pub topic: Option<String>,

    /// Custom pattern using {type} {topic} {year} {month} {mon} {day}
    #[arg(long, value_name = "PATTERN")]
    pub template: Option<String>,

    /// Copy files instead of moving them
    #[arg(long, conflicts_with = "move_files")]
    pub copy: bool,

    /// Move files (the usual default)
    #[arg(long = "move")]
    pub move_files: bool,

    /// Include subfolders of ORIGIN
    #[arg(long, conflicts_with = "no_recursive")]
    pub recursive: bool,

    /// Only sort files directly inside ORIGIN
    #[arg(long)]
    pub no_recursive: bool,

    /// Preview the result without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Which timestamp decides the year/month/day folders
    #[arg(long, default_value = "created")]
    pub date_source: DateSource,

    /// Print the run report as JSON after the run log
    #[arg(long)]
    pub json: bool,

    /// Print progress to stderr
    #[arg(long)]
    pub progress: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Change and save settings
    Set(ConfigSetArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigSetArgs {
    #[arg(long)]
    pub default_operation: Option<OperationMode>,

    #[arg(long, value_name = "BOOL")]
    pub default_subfolders: Option<bool>,

    #[arg(long, value_name = "LIST")]
    pub file_types: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub log_enabled: Option<bool>,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Clamped to 1..=100
    #[arg(long, value_name = "MB")]
    pub log_max_size_mb: Option<u32>,
}

impl ValueEnum for Structure {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Structure::YearMonth,
            Structure::YearMonthDay,
            Structure::FileType,
            Structure::FileTypeYearMonth,
            Structure::TopicYearMonth,
            Structure::Custom,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let value = match self {
            Structure::YearMonth => PossibleValue::new("year-month"),
            Structure::YearMonthDay => PossibleValue::new("year-month-day"),
            Structure::FileType => PossibleValue::new("file-type"),
            Structure::FileTypeYearMonth => PossibleValue::new("file-type-year-month"),
            Structure::TopicYearMonth => PossibleValue::new("topic-year-month"),
            Structure::Custom => PossibleValue::new("custom"),
        };
        Some(value.help(self.label()))
    }
}

impl ValueEnum for OperationMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[OperationMode::Move, OperationMode::Copy]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let value = match self {
            OperationMode::Move => PossibleValue::new("move"),
            OperationMode::Copy => PossibleValue::new("copy"),
        };
        Some(value)
    }
}

impl ValueEnum for DateSource {
    fn value_variants<'a>() -> &'a [Self] {
        &[DateSource::Created, DateSource::Modified]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let value = match self {
            DateSource::Created => PossibleValue::new("created"),
            DateSource::Modified => PossibleValue::new("modified"),
        };
        Some(value)
    }
}
