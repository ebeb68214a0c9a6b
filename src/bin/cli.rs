//! Volatility Cone CLI
//!
//! Fetches history from Yahoo Finance, prints the cone statistics and
//! writes the chart as SVG.
//!
//! Usage:
//!   vol-cone realized [--output FILE] [--start DATE] [--end DATE]
//!   vol-cone implied  [--output FILE] [--start DATE] [--end DATE]
//!
//! Logging follows RUST_LOG, defaulting to info.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use vol_cone::prelude::*;

#[derive(Parser)]
#[command(name = "vol-cone")]
#[command(version, about = "VIX volatility cones against SPY volatility")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// VIX cone summaries against mean SPY realized volatility
    Realized(RunArgs),
    /// VIX cone quantiles against live SPY call implied volatility
    Implied(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Chart output file (SVG)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// History start date, YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,

    /// History end date, YYYY-MM-DD (exclusive)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl RunArgs {
    fn apply(self, mut config: ConeConfig) -> ConeConfig {
        if let Some(output) = self.output {
            config.chart.output_path = output;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Realized(args) => run_realized(args.apply(ConeConfig::realized_vs_implied())),
        Command::Implied(args) => run_implied(args.apply(ConeConfig::implied_quantiles())),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_realized(config: ConeConfig) -> ConeResult<()> {
    let client = YahooClient::new()?;
    let report = build_realized_cone(&client, &config)?;

    println!(
        "{} Volatility Cone vs {} Realized Volatility",
        report.index_symbol, report.underlying_symbol
    );
    println!("==========================================\n");
    println!("{}", report.format_table());

    save_realized_cone(&report, &config.chart)?;
    println!("Chart written to {}", config.chart.output_path.display());
    Ok(())
}

fn run_implied(config: ConeConfig) -> ConeResult<()> {
    let client = YahooClient::new()?;
    let report = build_implied_cone(&client, &config, Utc::now())?;

    println!("{} Rolling Volatility", report.index_symbol);
    println!("==========================\n");
    println!("{}", report.table.format_head(5));

    println!("Cone quantiles:");
    println!("{}", report.format_bands());

    println!(
        "{} calls expiring {} (spot ${:.2}):",
        report.underlying_symbol, report.expiry, report.spot
    );
    println!("{}", report.format_calls_head(5));
    println!("Missing implied volatility: {}", report.missing_count());

    match &report.implied_band {
        Some(band) => println!("Implied volatility quantiles: {}\n", band),
        None => println!("Implied volatility quantiles: none solved\n"),
    }

    save_implied_cone(&report, &config.chart)?;
    println!("Chart written to {}", config.chart.output_path.display());
    Ok(())
}
