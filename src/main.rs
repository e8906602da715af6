/// Main entry point for the F&O movers scanner
///
/// Usage: fnoscan [EXPIRY] | fnoscan --init-config
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fnoscan::{
    config::{load_config, save_default_config},
    Config, MoversPipeline,
};

const DEFAULT_CONFIG_PATH: &str = "fnoscan.toml";

/// Logs go to stderr; stdout carries only the JSON report
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fnoscan={},warn", config.log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let arg = std::env::args().nth(1);

    if arg.as_deref() == Some("--init-config") {
        save_default_config(&config_path)?;
        eprintln!("Wrote default configuration to {}", config_path);
        return Ok(());
    }

    let config = load_config(&config_path)?;
    init_logging(&config);

    let expiry = arg
        .or_else(|| std::env::var("FNOSCAN_EXPIRY").ok())
        .filter(|e| !e.trim().is_empty());

    info!("🎯 F&O movers scan against {}", config.base_url);
    if let Some(expiry) = &expiry {
        info!("Requested expiry: {}", expiry);
    }

    let pipeline = MoversPipeline::new(config);

    match pipeline.run(expiry.as_deref()).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            error!("Scan aborted: {} ({})", e, e.error_code());
            println!("{}", serde_json::to_string_pretty(&e.report())?);
            std::process::exit(1);
        }
    }
}
