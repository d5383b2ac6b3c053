//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pivotreport.toml` files.

use crate::models::Dimension;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".pivotreport.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input sheet settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Language model settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Workbook settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the timestamped report is written to when no output is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Where to find the time log inside the input workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Sheet holding the time log.
    #[serde(default = "default_sheet")]
    pub sheet: String,

    /// Header names of the columns read from the sheet.
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sheet: default_sheet(),
            columns: ColumnNames::default(),
        }
    }
}

fn default_sheet() -> String {
    "Aggregate Data".to_string()
}

/// Header text of each input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_member_column")]
    pub member: String,
    #[serde(default = "default_client_column")]
    pub client: String,
    #[serde(default = "default_week_column")]
    pub week: String,
    #[serde(default = "default_activity_column")]
    pub activity: String,
    #[serde(default = "default_comments_column")]
    pub comments: String,
    #[serde(default = "default_time_column")]
    pub time: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            member: default_member_column(),
            client: default_client_column(),
            week: default_week_column(),
            activity: default_activity_column(),
            comments: default_comments_column(),
            time: default_time_column(),
        }
    }
}

fn default_member_column() -> String {
    "Source.Name".to_string()
}

fn default_client_column() -> String {
    "Client".to_string()
}

fn default_week_column() -> String {
    "Week".to_string()
}

fn default_activity_column() -> String {
    "Activity Name".to_string()
}

fn default_comments_column() -> String {
    "Comments".to_string()
}

fn default_time_column() -> String {
    "Time".to_string()
}

/// Chat-completions API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Prefer the OPENAI_API_KEY environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature; the API default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of leading rows sent to the model as context.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: default_api_url(),
            api_key: None,
            temperature: None,
            timeout_seconds: default_timeout(),
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_sample_rows() -> usize {
    100
}

/// Workbook generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Add a Charts sheet with hour distributions.
    #[serde(default)]
    pub include_charts: bool,

    /// Decimal places of Summary figures.
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Characters of the member name kept in detail sheet names.
    #[serde(default = "default_member_name_len")]
    pub member_name_len: usize,

    /// Fill colour of title and total rows (RGB hex, no '#').
    #[serde(default = "default_highlight")]
    pub highlight_color: String,

    /// Row/column dimension pairs, one cross-tab sheet each.
    #[serde(default = "default_crosstabs")]
    pub crosstabs: Vec<(Dimension, Dimension)>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_charts: false,
            decimals: default_decimals(),
            member_name_len: default_member_name_len(),
            highlight_color: default_highlight(),
            crosstabs: default_crosstabs(),
        }
    }
}

fn default_decimals() -> u32 {
    2
}

fn default_member_name_len() -> usize {
    15
}

fn default_highlight() -> String {
    "D9E1F2".to_string()
}

fn default_crosstabs() -> Vec<(Dimension, Dimension)> {
    vec![
        (Dimension::Member, Dimension::Client),
        (Dimension::Client, Dimension::Week),
    ]
}

impl ReportConfig {
    /// Highlight colour as an RGB integer, falling back to the default.
    pub fn highlight_rgb(&self) -> u32 {
        u32::from_str_radix(self.highlight_color.trim_start_matches('#'), 16)
            .ok()
            .filter(|rgb| *rgb <= 0xFF_FFFF)
            .unwrap_or(0xD9E1F2)
    }
}

/// Base URL without trailing slashes, so endpoint paths join cleanly.
fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.assistant.api_url = normalize_api_url(&config.assistant.api_url);

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `.pivotreport.toml` from `dir`, if present.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sheet) = args.sheet {
            self.input.sheet = sheet.clone();
        }

        if let Some(ref model) = args.model {
            self.assistant.model = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.assistant.api_url = normalize_api_url(api_url);
        }
        if args.api_key.is_some() {
            self.assistant.api_key = args.api_key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.assistant.timeout_seconds = timeout;
        }
        if let Some(rows) = args.sample_rows {
            self.assistant.sample_rows = rows;
        }

        // Flags always override
        if args.charts {
            self.report.include_charts = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
