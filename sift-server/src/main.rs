use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sift-server")]
#[command(about = "Sift search facade server")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "sift.toml")]
    config: String,

    /// Bind address, overrides the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sift=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = sift::config::Config::load(std::path::Path::new(&args.config))?;
    let addr = args.bind.unwrap_or_else(|| config.server.bind_addr.clone());

    tracing::info!("Starting sift server on {}", addr);
    tracing::info!("Store at {}", config.store.base_url());

    let store: Arc<dyn sift::store::DocumentStore> = Arc::new(
        sift::store::es::EsClient::from_config(&config.store, &config.search)?,
    );
    if !store.ping().await {
        tracing::warn!("document store is unreachable at startup, continuing anyway");
    }

    let manager = Arc::new(sift::lifecycle::IndexManager::new(
        store.clone(),
        Duration::from_secs(config.search.metadata_ttl_secs),
    ));
    let denoiser = Arc::new(sift::denoise::FieldDenoiser::new(
        store.clone(),
        config.denoise.batch_size,
    ));
    let stout: Option<Arc<dyn sift::stout::StoutIngest>> = if config.stout.enabled {
        Some(Arc::new(sift::stout::StoutTables::new(
            store.clone(),
            config.stout.index.clone(),
        )))
    } else {
        None
    };

    let state = sift::api::AppState {
        manager,
        denoiser,
        stout,
        limits: sift::query::SearchLimits {
            default_size: config.search.default_size,
            max_size: config.search.max_size,
        },
    };

    let server = sift::api::ApiServer::new(state, config.server.cors.clone());
    server.serve(&addr).await?;

    Ok(())
}
