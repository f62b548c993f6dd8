use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MetadataBackend {
    Jsonl,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Detect from the file extension and header bytes
    Auto,
    Csv,
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Input history file (CSV export or Chromium History SQLite database)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    /// Output directory for the report and metadata
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Work start time (e.g. "09:00", "9am", "13")
    #[arg(long, default_value = "09:00")]
    pub starttime: String,

    /// Work end time (e.g. "17:00", "5pm", "17")
    #[arg(long, default_value = "17:00")]
    pub endtime: String,

    /// Comma-separated work days (M,T,W,Th,F,Sa,Su)
    #[arg(long, default_value = "M,T,W,Th,F")]
    pub days: String,

    /// Keywords/domains considered work-related (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub work_keywords: Vec<String>,

    /// Custom category overrides, format: "keyword1(categoryA),keyword two(categoryB)"
    #[arg(long)]
    pub custom_categories: Option<String>,

    /// Optional path to a rules file (YAML) overriding the built-in tables
    #[arg(long)]
    pub rules_path: Option<PathBuf>,

    /// Metadata backend
    #[arg(long, value_enum, default_value_t = MetadataBackend::Jsonl)]
    pub metadata_backend: MetadataBackend,

    /// Report file name inside the output directory
    #[arg(long, default_value = "report.html")]
    pub report_name: String,

    /// Show per-row classification for the first few rows and exit
    #[arg(long)]
    pub diagnose: bool,

    /// Number of rows to inspect with --diagnose
    #[arg(long, default_value_t = 5)]
    pub diagnose_rows: usize,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
