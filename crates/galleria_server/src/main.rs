use anyhow::Result;
use clap::Parser;
use galleria_server::{
    AccessGate, ApiState, IngestionPipeline, ServerConfig, UserDirectory, create_router,
    init_logging,
};
use galleria_storage::{FileSystemStorage, StagingArea};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Galleria image upload server", long_about = None)]
struct Args {
    /// Configuration file (default: ./galleria.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Enable uploads regardless of the configuration
    #[arg(long)]
    allow_upload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if args.allow_upload {
        config.allow_upload = true;
    }

    init_logging(&config.log_level, config.json_logs)?;

    info!(
        bind = %config.bind,
        allow_upload = config.allow_upload,
        content_dir = %config.content_dir.display(),
        staging_dir = %config.staging_dir.display(),
        "Starting Galleria"
    );

    let store = Arc::new(FileSystemStorage::open(&config.content_dir)?);
    store.sweep()?;
    let staging = StagingArea::open(&config.staging_dir)?;
    let pipeline = Arc::new(IngestionPipeline::bootstrap(store, staging).await?);

    let users = UserDirectory::from_file(&config.users_file)?;
    let gate = AccessGate::new(config.allow_upload, users);

    let app = create_router(ApiState::new(
        pipeline,
        gate,
        config.cookie_name.as_str(),
        config.max_upload_bytes,
    ));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down");
    })
    .await?;

    Ok(())
}
