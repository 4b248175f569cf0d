//! costlens CLI - ranks expensive custom properties and rules from
//! performance exports and writes a remediation report.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use costlens_core::{AnalyzerConfig, Domain};
use costlens_diagnostics::{DiagnosticEngine, DiagnosticReport, RankingOptions};
use costlens_ingest::{load_all, TabularFileSource, TelemetrySource};
use costlens_report::{default_file_name, render, OutputFormat, RenderContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "costlens")]
#[command(about = "Performance cost analyzer for custom properties and correlation rules", long_about = None)]
struct Cli {
    /// TOML file overriding thresholds and engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze custom property exports (.tabular)
    Properties(AnalyzeArgs),
    /// Analyze CustomRule exports
    Rules(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Export files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Records rendered in detail
    #[arg(long)]
    top: Option<usize>,

    /// Skip records cheaper than this many milliseconds
    #[arg(long)]
    threshold_ms: Option<f64>,

    /// Output file (default: costlens_<domain>_<timestamp>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// html, json or text
    #[arg(long, default_value = "html")]
    format: OutputFormat,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    let (domain, args) = match cli.command {
        Commands::Properties(args) => (Domain::FieldEvaluator, args),
        Commands::Rules(args) => (Domain::CorrelationRule, args),
    };

    let path = analyze(domain, args, config).await?;
    println!("{}", path.display());
    Ok(())
}

/// Run one analysis and write the report; returns the written path.
async fn analyze(domain: Domain, args: AnalyzeArgs, mut config: AnalyzerConfig) -> Result<PathBuf> {
    if let Some(threshold) = args.threshold_ms {
        config.domain_mut(domain).min_cost_ms = threshold;
    }
    if let Some(top) = args.top {
        config.report.top = top;
    }
    config.validate()?;

    let sources: Vec<Box<dyn TelemetrySource>> = args
        .files
        .iter()
        .map(|path| Box::new(TabularFileSource::new(path, domain)) as Box<dyn TelemetrySource>)
        .collect();
    let labels: Vec<String> = sources.iter().map(|s| s.label()).collect();

    let records = load_all(sources).await?;
    if records.is_empty() {
        bail!("No {} loaded from {} input file(s)", domain.noun(), args.files.len());
    }

    let engine = DiagnosticEngine::new(&config);
    let options = RankingOptions {
        min_cost: domain.unit().from_millis(config.domain(domain).min_cost_ms),
        max_display: config.report.top,
    };
    let report = engine.run(domain, records, &options);

    let now = chrono::Local::now().naive_local();
    let ctx = RenderContext {
        generated_at: now,
        sources: labels,
    };
    let rendered = render(&report, args.format, &ctx)?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(domain, args.format, now)));
    tokio::fs::write(&path, rendered)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    info!("Report written to {}", path.display());
    log_summary(&report);
    Ok(path)
}

fn log_summary(report: &DiagnosticReport) {
    let summary = &report.summary;
    info!(
        "{} {} analyzed: {} critical, {} high, {} medium, {} low",
        summary.total_analyzed,
        report.domain.noun(),
        summary.critical,
        summary.high,
        summary.medium,
        summary.low
    );
    if summary.with_failures > 0 {
        tracing::warn!(
            "{} with cancellations: events are bypassing correlation",
            summary.with_failures
        );
    }
}
