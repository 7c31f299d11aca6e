// src/bin/show_stats.rs
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;

use msci_returns::config::Cli;
use msci_returns::services::pipeline::prepare_series;
use msci_returns::services::statistics::{build_panel, summarize};

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Cli::parse().into_config()?;
    info!("Printing statistics for {}", config.input.display());

    let series = prepare_series(&config)
        .with_context(|| format!("Could not prepare returns from {}", config.input.display()))?;
    let stats = summarize(&series);

    println!("{}", build_panel(&series, &stats, &config.index_name).to_text());
    Ok(())
}
