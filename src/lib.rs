pub mod analysis;
pub mod commands;
pub mod config;
pub mod core;
pub mod fetcher;
pub mod indicators;
pub mod models;

use anyhow::Result;
use clap::Parser;

use crate::commands::pages::{build_page, Page};
use crate::config::AppConfig;
use crate::core::orchestrator::SeriesService;
use crate::models::Granularity;

/// Brazilian macroeconomic indicators (BCB, IBGE, Ipeadata).
#[derive(Debug, Parser)]
#[command(name = "br-macro-dashboard", version, about)]
pub struct Cli {
    /// dashboard, interest-rates, inflation, gdp or exchange-rates
    #[arg(long, default_value = "dashboard")]
    pub page: Page,

    /// monthly, quarterly or annual (mensal, trimestral, anual)
    #[arg(long, default_value = "monthly")]
    pub period: Granularity,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env();
    let service = SeriesService::new(&config);

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(build_page(&service, cli.page, cli.period));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
