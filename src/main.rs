//! PivotReport - pivot summaries from time-tracking spreadsheets
//!
//! A CLI tool that reads a time log workbook, sums hours per client,
//! activity and week, and writes a multi-sheet summary workbook with
//! per-member details. Questions about the data can be answered by a
//! hosted language model.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, missing sheet/columns, write failure, etc.)

mod analysis;
mod assistant;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use assistant::DataAssistant;
use chrono::{Local, Utc};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{Dimension, InsightsReport, ReportMetadata, TimeEntry};
use report::{ReportWriter, WorkbookOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("PivotReport v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .pivotreport.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the sheet, column names, model, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete report workflow. Returns the exit code.
async fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load the time log
    let input = args.input_path();
    println!(
        "📥 Loading {} (sheet '{}')",
        input.display(),
        config.input.sheet
    );
    let loaded = loader::load_entries(input, &config.input.sheet, &config.input.columns)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let entries = &loaded.entries;
    debug!("Columns found: {}", loaded.headers.join(", "));

    let members = analysis::team_members(entries);
    println!(
        "✅ File loaded successfully. Found {} team members.",
        members.len()
    );
    if entries.is_empty() {
        warn!("Sheet '{}' contains no entries", loaded.sheet);
    }

    // Step 2: Preview
    if let Some(rows) = args.preview {
        println!("\n🔎 First {} rows:\n", rows.min(entries.len()));
        print!("{}", report::generate_preview(entries, &config.input.columns, rows));
    }

    // Step 3: Write the workbook
    let output = if args.dry_run {
        println!("\n🔍 Dry run: no workbook written.");
        None
    } else {
        let path = args.output_path(&config.general.output_dir, Local::now());
        write_workbook(&config, entries, &path)?;
        Some(path)
    };

    // Step 4: Insights
    if args.insights {
        let report = build_insights_report(
            &args,
            &config,
            entries,
            members.len(),
            output.as_ref(),
            start_time.elapsed().as_secs_f64(),
        );
        let text = match args.format {
            OutputFormat::Json => report::generate_json_insights(&report)?,
            OutputFormat::Markdown => report::generate_markdown_insights(&report),
        };
        println!("\n{}", text);
    }

    // Step 5: Questions
    if args.wants_answers() {
        answer_questions(&args, &config, entries).await?;
    }

    println!("\n📊 Report Summary:");
    println!("   Entries: {}", entries.len());
    println!("   Team members: {}", members.len());
    println!(
        "   Total hours: {:.2}",
        analysis::round_hours(analysis::grand_total(entries), config.report.decimals)
    );
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    if let Some(path) = output {
        println!("\n✅ Pivot report saved to: {}", path.display());
    }

    Ok(0)
}

/// Write the pivot workbook to `path`, creating its directory if needed.
fn write_workbook(config: &Config, entries: &[TimeEntry], path: &Path) -> Result<()> {
    println!("\n📝 Generating pivot report...");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let writer = ReportWriter::new(WorkbookOptions::from(config));
    let written = writer
        .write(entries, path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    println!("   Sheets: {}", written.sheets.join(", "));
    Ok(())
}

/// Collect metadata, insights and totals for the insights printout.
fn build_insights_report(
    args: &Args,
    config: &Config,
    entries: &[TimeEntry],
    team_members: usize,
    output: Option<&PathBuf>,
    duration_seconds: f64,
) -> InsightsReport {
    let decimals = config.report.decimals;
    let totals = [Dimension::Client, Dimension::Activity, Dimension::Week, Dimension::Member]
        .into_iter()
        .map(|d| analysis::rounded(&analysis::group_sum(entries, d), decimals))
        .collect();

    InsightsReport {
        metadata: ReportMetadata {
            source_file: args.input_path().display().to_string(),
            sheet: config.input.sheet.clone(),
            generated_at: Utc::now(),
            entries: entries.len(),
            team_members,
            output_file: output.map(|p| p.display().to_string()),
            duration_seconds,
        },
        insights: analysis::insights(entries),
        totals,
    }
}

/// Answer `--ask` questions, then read more from stdin with `--chat`.
///
/// A failed question is reported and never aborts the run.
async fn answer_questions(args: &Args, config: &Config, entries: &[TimeEntry]) -> Result<()> {
    println!("\n🤖 Model: {}", config.assistant.model);

    let assistant = match DataAssistant::new(
        config.assistant.clone(),
        &config.input.columns,
        entries,
        !args.quiet,
    ) {
        Ok(assistant) => assistant,
        Err(e) => {
            eprintln!("❌ Error generating answer: {}", e);
            return Ok(());
        }
    };

    for question in &args.ask {
        ask_and_print(&assistant, question).await;
    }

    if args.chat {
        println!("\n💬 Ask me anything about this dataset (empty line to finish):");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush().context("Failed to flush stdout")?;

            let Some(line) = lines.next_line().await.context("Failed to read question")? else {
                break;
            };
            let question = line.trim();
            if question.is_empty() {
                break;
            }
            ask_and_print(&assistant, question).await;
        }
    }

    Ok(())
}

async fn ask_and_print(assistant: &DataAssistant, question: &str) {
    println!("\n❓ {}", question);
    match assistant.ask(question).await {
        Ok(answer) => println!("\n### 🤖 Answer\n\n{}", answer),
        Err(e) => {
            warn!("Question failed: {}", e);
            eprintln!("❌ Error generating answer: {}", e);
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location; a file that exists but cannot be parsed is fatal
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
