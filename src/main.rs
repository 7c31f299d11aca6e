use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use env_logger;
use log::{error, info};

use msci_returns::config::Cli;
use msci_returns::services::pipeline;

fn main() -> Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the analysis...");

    let config = Cli::parse()
        .into_config()
        .context("Invalid configuration")?;
    info!("Reading prices from {}", config.input.display());

    match pipeline::run(&config) {
        Ok(report) => {
            info!(
                "Chart '{}' with {} bars written to {}",
                report.chart.title,
                report.chart.bars.len(),
                config.output.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(e).context("Failed to build return histogram")
        }
    }
}
