pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{ConversionService, RateCache, ValuationAggregator};
use crate::store::DiskPreferences;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Convert {
        from: String,
        to: String,
        amount: Option<f64>,
    },
    Parse {
        text: String,
    },
    Currency {
        code: Option<String>,
    },
    Serve {
        port: Option<u16>,
    },
}

/// Wires the rate cache, the configured provider and the fetch timeout.
pub fn build_conversion_service(config: &AppConfig) -> Result<ConversionService> {
    let cache = Arc::new(RateCache::with_freshness(config.conversion.freshness()?));
    let provider = providers::build_rate_provider(&config.providers)?;
    Ok(ConversionService::with_timeout(
        cache,
        provider,
        Duration::from_secs(config.conversion.timeout_secs),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxval starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let configured_currency = config.reporting_currency()?;

    match command {
        AppCommand::Summary => {
            let preferences = DiskPreferences::open(&config.data_path()?)?;
            let target =
                cli::currency::reporting_currency(&preferences, &configured_currency).await;
            let aggregator = ValuationAggregator::new(build_conversion_service(&config)?);
            cli::summary::run(
                &config.portfolios,
                &aggregator,
                &configured_currency,
                &target,
            )
            .await
            .map(|_| ())
        }
        AppCommand::Convert { from, to, amount } => {
            let conversion = build_conversion_service(&config)?;
            cli::convert::run(&conversion, &from, &to, amount).await
        }
        AppCommand::Parse { text } => {
            let preferences = DiskPreferences::open(&config.data_path()?)?;
            let preferred =
                cli::currency::reporting_currency(&preferences, &configured_currency).await;
            cli::parse::run(&text, &preferred).map(|_| ())
        }
        AppCommand::Currency { code } => {
            let preferences = DiskPreferences::open(&config.data_path()?)?;
            cli::currency::run(&preferences, &configured_currency, code.as_deref())
                .await
                .map(|_| ())
        }
        AppCommand::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let conversion = build_conversion_service(&config)?;
            server::start_server(server::AppState::new(conversion), port).await
        }
    }
}
