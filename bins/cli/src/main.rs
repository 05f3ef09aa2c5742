//! Matchbook CLI
//!
//! Runs a three-way match over a JSON request file and prints the result.

mod report;
mod request;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use matchbook_core::matching::{MatchStatus, ThreeWayMatch, filter_by_status};
use matchbook_shared::{AppConfig, AppError};

use crate::request::MatchRequest;

#[derive(Parser)]
#[command(name = "matchbook")]
#[command(about = "Three-way match of purchase order, goods receipt and invoice")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match every line and print the full result
    Evaluate(EvaluateArgs),
    /// Match every line and print only the summary
    Summary(MatchArgs),
}

#[derive(Args)]
struct MatchArgs {
    /// JSON request file with purchase_order, goods_receipt and invoice
    #[arg(short, long)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Quantity tolerance in percent (overrides request and config)
    #[arg(long)]
    quantity_tolerance: Option<Decimal>,

    /// Price tolerance in percent (overrides request and config)
    #[arg(long)]
    price_tolerance: Option<Decimal>,
}

#[derive(Args)]
struct EvaluateArgs {
    #[command(flatten)]
    common: MatchArgs,

    /// Only show lines with this status
    #[arg(long, value_parser = parse_status)]
    status: Option<MatchStatus>,
}

fn parse_status(value: &str) -> Result<MatchStatus, String> {
    MatchStatus::parse(value).ok_or_else(|| {
        format!(
            "expected one of: {}",
            MatchStatus::ALL.map(|s| s.as_str()).join(", ")
        )
    })
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(false);
            let err = AppError::from(err);
            error!(code = err.error_code(), "{err}");
            return ExitCode::from(err.exit_code());
        }
    };
    init_tracing(config.logging.json);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            error!(error = %format!("{err:#}"), "Match failed");
            ExitCode::from(code)
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "matchbook=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Evaluate(EvaluateArgs { common: args, status }) => {
            let session = run_match(&args, config)?;
            let output = match args.format {
                Format::Json => match status {
                    Some(status) => serde_json::to_string_pretty(&filter_by_status(
                        &session.matching_results,
                        Some(status),
                    )),
                    None => serde_json::to_string_pretty(&session),
                }
                .context("Failed to serialize match")?,
                Format::Text => report::render_match(&session, status),
            };
            println!("{}", output.trim_end());
        }
        Command::Summary(args) => {
            let session = run_match(&args, config)?;
            let summary = session.summary();
            let output = match args.format {
                Format::Json => serde_json::to_string_pretty(&summary)
                    .context("Failed to serialize summary")?,
                Format::Text => {
                    report::render_summary(&summary, session.purchase_order.currency)
                }
            };
            println!("{}", output.trim_end());
        }
    }
    Ok(())
}

fn run_match(args: &MatchArgs, config: &AppConfig) -> anyhow::Result<ThreeWayMatch> {
    let request = MatchRequest::from_file(&args.input, config.matching.currency)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let tolerance = request.resolve_tolerance(
        args.quantity_tolerance,
        args.price_tolerance,
        &config.matching,
    );
    info!(
        match_id = %request.id,
        po = %request.purchase_order.number,
        quantity_tolerance = %tolerance.quantity,
        price_tolerance = %tolerance.price,
        adjustments = request.adjustments.len(),
        "Running three-way match"
    );

    let session = request
        .into_match(tolerance)
        .map_err(|err| {
            warn!(code = err.error_code(), "Match input rejected");
            AppError::from(err)
        })
        .context("Match rejected")?;

    for result in &session.matching_results {
        debug!(
            line = result.line_number,
            status = %result.status,
            variance = %result.variance.total,
            issues = result.issues.len(),
            "Line evaluated"
        );
    }

    let candidates = session.exception_candidates();
    if session.overall_status == MatchStatus::Matched {
        info!(match_id = %session.id, "All lines matched");
    } else {
        warn!(
            match_id = %session.id,
            overall = %session.overall_status,
            lines = ?candidates,
            "Lines need review"
        );
    }

    Ok(session)
}
