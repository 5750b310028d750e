use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wastesnap::{
    cache::{open_store, ResultCache},
    config::Config,
    services::AnalysisService,
    vision::GeminiClient,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "wastesnap")]
#[command(version)]
#[command(about = "Detect and categorize waste items in photos")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("wastesnap={},tower_http=trace", cli.log_level)
    } else {
        format!("wastesnap={}", cli.log_level)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting WasteSnap v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let store = open_store(&config.cache).await?;
    let cache = Arc::new(ResultCache::from_config(store, &config.cache)?);
    info!(
        "Result cache ready: backend={:?}, capacity={}",
        config.cache.backend,
        cache.capacity()
    );

    let vision = GeminiClient::new(&config.vision)?;
    info!("Vision model: {}", vision.model());

    let analysis = AnalysisService::new(Arc::new(vision), cache);

    let server = WebServer::new(&config.web, analysis)?;
    server.serve().await
}
