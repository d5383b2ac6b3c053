//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::{DateTime, Local};
use clap::Parser;
use std::path::{Path, PathBuf};

/// PivotReport - pivot summaries from time-tracking spreadsheets
///
/// Reads the "Aggregate Data" sheet of a time log, sums hours per client,
/// activity and week, and writes a multi-sheet summary workbook with one
/// detail sheet per team member.
///
/// Examples:
///   pivot-report --input timesheets.xlsx
///   pivot-report --input timesheets.xlsx --insights --charts
///   pivot-report --input timesheets.xlsx --ask "Which client grew the most?"
///   pivot-report --input timesheets.xlsx --dry-run --preview
///   pivot-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Excel workbook (.xlsx) holding the time log
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Sheet holding the time log (default: "Aggregate Data")
    #[arg(short, long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output workbook path
    ///
    /// Defaults to pivot_report_<timestamp>.xlsx in the configured output directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the first rows of the loaded data
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "20")]
    pub preview: Option<usize>,

    /// Print key insights (top client, activity, member, week)
    #[arg(long)]
    pub insights: bool,

    /// Output format for --insights (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Add a Charts sheet with hour distributions by client and activity
    #[arg(long)]
    pub charts: bool,

    /// Ask a question about the data (repeatable)
    #[arg(long, value_name = "QUESTION")]
    pub ask: Vec<String>,

    /// Read questions interactively from stdin until an empty line
    #[arg(long)]
    pub chat: bool,

    /// Load and analyze without writing the workbook
    #[arg(long)]
    pub dry_run: bool,

    /// Language model to use for questions
    #[arg(short, long, env = "PIVOTREPORT_MODEL")]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, value_name = "URL", env = "OPENAI_BASE_URL")]
    pub api_url: Option<String>,

    /// API key for the language model
    #[arg(long, value_name = "KEY", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of leading rows sent to the model as context
    #[arg(long, value_name = "ROWS")]
    pub sample_rows: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pivotreport.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .pivotreport.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the insights printout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the input path (validated to be present unless --init-config).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Whether any question will be sent to the language model.
    pub fn wants_answers(&self) -> bool {
        self.chat || !self.ask.is_empty()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        let input = self.input_path();
        if !input.exists() {
            return Err(format!("Input file does not exist: {}", input.display()));
        }
        if !input.is_file() {
            return Err(format!("Input path is not a file: {}", input.display()));
        }
        let is_xlsx = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        if !is_xlsx {
            return Err("Input file must be an .xlsx workbook".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.ask.iter().any(|q| q.trim().is_empty()) {
            return Err("Questions passed to --ask must not be empty".to_string());
        }

        if self.sample_rows == Some(0) {
            return Err("Sample rows must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.dry_run && self.output.is_some() {
            return Err("Cannot use --output with --dry-run".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Output path: the explicit one, or a timestamped name in `output_dir`.
    pub fn output_path(&self, output_dir: &str, now: DateTime<Local>) -> PathBuf {
        match self.output {
            Some(ref path) => path.clone(),
            None => Path::new(output_dir).join(default_report_name(now)),
        }
    }
}

/// Timestamped report file name, e.g. `pivot_report_20240131_094500.xlsx`.
pub fn default_report_name(now: DateTime<Local>) -> String {
    format!("pivot_report_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}
