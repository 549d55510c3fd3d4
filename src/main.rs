use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use tripwise::config::TripwiseConfig;
use tripwise::llm::ChatCompletionsClient;
use tripwise::orchestrator::PlanOrchestrator;
use tripwise::{TripwiseError, telemetry, web};

/// Validated travel plan generation for Indian destinations
#[derive(Parser, Debug)]
#[command(name = "tripwise", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "TRIPWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Load and validate the configuration, print it and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<TripwiseError>() {
                Some(err) => err.user_message(),
                None => format!("{e:#}"),
            };
            eprintln!("Error: {message}");
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = TripwiseConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.check_config {
        println!("Configuration OK");
        println!("{:#?}", config);
        if config.require_api_key().is_err() {
            println!("Warning: no LLM API key configured, the server will not start");
        }
        return Ok(());
    }

    // reqwest, the OTLP exporter and axum-server all sit on rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    let _telemetry = telemetry::init_telemetry(&config.logging, cli.verbose)?;

    config.require_api_key()?;
    let client = ChatCompletionsClient::new(&config.llm)?;
    let orchestrator = Arc::new(PlanOrchestrator::new(Arc::new(client), &config));

    info!(
        "Starting tripwise {} with model {}",
        tripwise::VERSION,
        orchestrator.model_name()
    );
    web::run(orchestrator, &config.server).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["tripwise", "--port", "9000", "-v", "--check-config"]);
        assert_eq!(cli.port, Some(9000));
        assert!(cli.verbose);
        assert!(cli.check_config);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
