//! Standalone mock provider.
//!
//! Serves interactions loaded from a JSON file until Ctrl-C, then writes the
//! contract document for whatever was exercised.
//!
//! Usage:
//!   accord-mock --interactions interactions.json [--config accord.yaml] [--port 9222]

use accord_mock::{InteractionDefinition, MockProviderSession, PactConfig};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "accord-mock")]
#[command(author, version, about = "Serve pact interactions and record the contract")]
struct Args {
    /// JSON file holding an array of interaction definitions
    #[arg(short, long)]
    interactions: PathBuf,

    /// YAML session configuration
    #[arg(short, long, env = "ACCORD_CONFIG")]
    config: Option<PathBuf>,

    /// Consumer name (overrides the config file)
    #[arg(long, env = "ACCORD_CONSUMER")]
    consumer: Option<String>,

    /// Provider name (overrides the config file)
    #[arg(long, env = "ACCORD_PROVIDER")]
    provider: Option<String>,

    /// Listener port (overrides the config file)
    #[arg(short, long, env = "ACCORD_PORT")]
    port: Option<u16>,

    /// Fail if any interaction is never invoked
    #[arg(long)]
    strict: bool,
}

fn load_config(args: &Args) -> anyhow::Result<PactConfig> {
    let mut config = match args.config {
        Some(ref path) => PactConfig::from_file(path)?,
        None => PactConfig::new("Consumer", "Provider"),
    };
    if let Some(ref consumer) = args.consumer {
        config.consumer = consumer.clone();
    }
    if let Some(ref provider) = args.provider {
        config.provider = provider.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.strict {
        config.strict = true;
    }
    config.validate()?;
    Ok(config)
}

fn load_interactions(path: &Path) -> anyhow::Result<Vec<InteractionDefinition>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading interactions {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing interactions {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let definitions = load_interactions(&args.interactions)?;

    let session = MockProviderSession::start(config).await?;
    for definition in definitions {
        session
            .register(definition)
            .context("registering interaction")?;
    }

    info!(
        "Serving {} interactions at {} (Ctrl-C to stop)",
        session.interactions().len(),
        session.base_uri()
    );
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    let pact_file = session.finish().await?;
    info!("Contract written to {}", pact_file.display());
    Ok(())
}
