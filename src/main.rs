use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use videofinder::api::ApiServer;
use videofinder::{Config, Discovery};

const BOOTSTRAP_FILTER: &str = "videofinder=info,warn";

#[derive(Parser)]
#[command(name = "videofinder")]
#[command(version, author = "TigreRoll")]
#[command(about = "Short educational video discovery service")]
struct Cli {
    /// Configuration file (defaults to the standard search paths)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config loading logs through a bootstrap subscriber until the
    // configured level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_FILTER)))
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || load_config(cli.config.as_deref()))?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("videofinder=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    info!("🚀 Video Finder starting...");
    info!("{}", config.summary());
    if config.classifier.endpoint.is_none() {
        warn!("No content classifier configured; suitability check is skipped");
    }

    let discovery = Discovery::from_config(&config).await?;
    ApiServer::new(Arc::new(discovery), Arc::new(config)).start().await
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path.to_string_lossy()),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videofinder.toml");
        std::fs::write(&path, "[server]\nport = 8088\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 8088);

        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
