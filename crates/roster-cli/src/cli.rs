//! CLI argument definitions for the roster importer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use roster_import::ImportKind;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Import member and employer spreadsheets into the roster store",
    long_about = "Import member and employer spreadsheets into the roster store.\n\n\
                  Suggests column mappings, validates every row, and imports the\n\
                  records with duplicate detection and an error report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (names, emails, phone numbers) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Pipeline settings file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the canonical tables and their fields.
    Tables,

    /// Suggest a column mapping for a file.
    Suggest(SuggestArgs),

    /// Validate a file against a table without importing it.
    Validate(ValidateArgs),

    /// Validate and import a file into the store.
    Import(ImportArgs),
}

#[derive(Parser)]
pub struct InputArgs {
    /// Delimited text export (CSV or TSV).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field delimiter (defaults to tab for .tsv files, comma otherwise).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,
}

#[derive(Parser)]
pub struct SuggestArgs {
    /// Target table name (see `roster tables`).
    #[arg(value_name = "TABLE")]
    pub table: String,

    #[command(flatten)]
    pub input: InputArgs,

    /// Save the suggestion as a mapping file for later runs.
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Target table name (see `roster tables`).
    #[arg(value_name = "TABLE")]
    pub table: String,

    #[command(flatten)]
    pub input: InputArgs,

    /// Saved mapping file (defaults to fresh suggestions).
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Keep only suggestions at or above the promote threshold.
    #[arg(long = "auto-promote")]
    pub auto_promote: bool,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// What the rows describe.
    #[arg(value_name = "KIND", value_enum)]
    pub kind: ImportKindArg,

    #[command(flatten)]
    pub input: InputArgs,

    /// JSON store file; created when missing.
    #[arg(long = "store", value_name = "PATH")]
    pub store: PathBuf,

    /// Saved mapping file (defaults to fresh suggestions).
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Keep only suggestions at or above the promote threshold.
    #[arg(long = "auto-promote")]
    pub auto_promote: bool,

    /// Directory for the error report (default: next to the input file).
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Employer for worker rows without an employer name.
    #[arg(long = "default-employer", value_name = "NAME")]
    pub default_employer: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ImportKindArg {
    Workers,
    Employers,
}

impl From<ImportKindArg> for ImportKind {
    fn from(kind: ImportKindArg) -> Self {
        match kind {
            ImportKindArg::Workers => ImportKind::Workers,
            ImportKindArg::Employers => ImportKind::Employers,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
