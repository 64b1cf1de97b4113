//! Catalog API server entry point

use anyhow::Result;
use catalog_api::{
    config,
    repository::CatalogLoader,
    web::{create_router, AppState},
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Course catalog search API
#[derive(Parser, Debug)]
#[command(name = "catalog-api", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting catalog-api v{}", catalog_api::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    let repositories = CatalogLoader::load(&settings)?;

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    let state = AppState::new(settings, repositories);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);
    info!("GraphiQL available at http://{}/graphql", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
