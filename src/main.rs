//! Fraud Sentinel - Main Entry Point
//!
//! Scores a single transaction from the command line, or every row of a
//! CSV file, and writes the assessments to stdout or a file. Logs go to
//! stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fraud_sentinel::{
    config::{AppConfig, InvalidRowPolicy, LogFormat, LoggingConfig},
    engine::RiskEngine,
    report::{render_assessment_text, write_scored_csv, AssessmentView, BatchReport},
    source::read_transactions_from_path,
    summary::BatchSummary,
    types::transaction::{DEVICE_TYPES, MERCHANT_CATEGORIES},
    TransactionRecord,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Largest amount accepted by the interactive `score` command
const MAX_INTERACTIVE_AMOUNT: f64 = 5000.0;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: config/config.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single transaction
    Score {
        /// Transaction amount ($0 - $5000)
        #[arg(long, default_value_t = 250.0, value_parser = parse_amount)]
        amount: f64,

        /// Hour of day (0-23)
        #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(i64).range(0..=23))]
        hour: i64,

        /// Merchant category
        #[arg(long, default_value = "Retail", value_parser = MERCHANT_CATEGORIES)]
        merchant: String,

        /// Device type
        #[arg(long, default_value = "Mobile", value_parser = DEVICE_TYPES)]
        device: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ScoreFormat::Text)]
        format: ScoreFormat,
    },

    /// Score every row of a CSV file
    /// (columns: amount, transaction_time, merchant_category, device_type)
    Batch {
        /// CSV file to score
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = BatchFormat::Json)]
        format: BatchFormat,

        /// Handling of rows with unreadable fields (overrides config)
        #[arg(long, value_enum)]
        on_invalid: Option<InvalidRowArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScoreFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum BatchFormat {
    /// Report with summary, scored rows and rejected rows
    Json,
    /// Source rows with fraud_score and is_fraud appended
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum InvalidRowArg {
    Skip,
    Default,
}

impl From<InvalidRowArg> for InvalidRowPolicy {
    fn from(arg: InvalidRowArg) -> Self {
        match arg {
            InvalidRowArg::Skip => InvalidRowPolicy::Skip,
            InvalidRowArg::Default => InvalidRowPolicy::Default,
        }
    }
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !(0.0..=MAX_INTERACTIVE_AMOUNT).contains(&amount) {
        return Err(format!("amount must be between 0 and {}", MAX_INTERACTIVE_AMOUNT));
    }
    Ok(amount)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Initialize logging
    init_logging(&config.logging)?;

    info!("Starting Fraud Sentinel");
    info!(
        "Fraud threshold: {:.2}, score ceiling: {:.2}, risk levels: medium>={:.2}, high>={:.2}",
        config.scoring.fraud_threshold,
        config.scoring.ceiling,
        config.risk_levels.medium,
        config.risk_levels.high
    );

    let engine = RiskEngine::new(&config)?;
    info!(rules = ?engine.rules().labels(), "Rule table loaded");

    match cli.command {
        Commands::Score {
            amount,
            hour,
            merchant,
            device,
            format,
        } => {
            let record = TransactionRecord::new(amount, hour, merchant, device);
            run_score(&engine, &config, &record, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch {
            file,
            output,
            format,
            on_invalid,
        } => {
            let policy = on_invalid
                .map(InvalidRowPolicy::from)
                .unwrap_or(config.batch.on_invalid_row);
            run_batch(&engine, &config, &file, output.as_deref(), format, policy)
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("fraud_sentinel={}", logging.level).parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    Ok(())
}

fn run_score(
    engine: &RiskEngine,
    config: &AppConfig,
    record: &TransactionRecord,
    format: ScoreFormat,
) -> Result<()> {
    let assessment = engine.score(record);

    info!(
        risk_score = assessment.score,
        is_fraud = assessment.is_fraud,
        reasons = assessment.reasons.len(),
        "Transaction scored"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        ScoreFormat::Text => {
            write!(
                out,
                "{}",
                render_assessment_text(record, &assessment, &config.risk_levels)
            )?;
        }
        ScoreFormat::Json => {
            let view = AssessmentView::new(record, &assessment, &config.risk_levels);
            serde_json::to_writer_pretty(&mut out, &view)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn run_batch(
    engine: &RiskEngine,
    config: &AppConfig,
    file: &Path,
    output: Option<&Path>,
    format: BatchFormat,
    policy: InvalidRowPolicy,
) -> Result<ExitCode> {
    let batch = match read_transactions_from_path(file, policy) {
        Ok(batch) => batch,
        Err(e) => {
            error!(path = %file.display(), error = %e, "Failed to read transaction source");
            eprintln!("Failed to read CSV: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let start_time = Instant::now();
    let assessments = engine.score_batch(&batch.records());
    let processing_time = start_time.elapsed();

    let summary = BatchSummary::from_assessments(&assessments);
    info!(
        flagged = summary.flagged,
        total = summary.total,
        rejected = batch.rejected.len(),
        processing_time_us = processing_time.as_micros(),
        "Fraudulent transactions detected: {} / {}",
        summary.flagged,
        summary.total
    );
    summary.log_summary();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        BatchFormat::Json => {
            let report = BatchReport::new(
                file.display().to_string(),
                &batch,
                &assessments,
                &config.risk_levels,
            )?;
            report.write_json(&mut writer)?;
            writeln!(writer)?;
        }
        BatchFormat::Csv => write_scored_csv(&mut writer, &batch, &assessments)?,
    }

    writer.flush()?;

    if let Some(path) = output {
        info!(path = %path.display(), "Results written");
    }

    Ok(ExitCode::SUCCESS)
}
