use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pit_core::Simulation;
use pit_daemon::{
    clock::SystemClock, config::Args, drain, http, recognizer, service::PitService,
    uploads::UploadStore,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.into_config()?;
    info!("starting daemon with config: {:?}", config);

    let uploads = UploadStore::new(&config.upload_dir);
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("create upload dir {}", config.upload_dir.display()))?;

    let sim = Simulation::new(config.policy, config.process_interval_delta()?);
    let svc = Arc::new(PitService::new(
        sim,
        uploads,
        recognizer::from_config(&config.recognizer),
        Arc::new(SystemClock::new(config.utc_offset)),
    ));

    let drain_task = drain::spawn_drain_loop(Arc::clone(&svc), config.wake_interval);

    let app = http::router(svc, config.frontend.clone(), config.max_upload_bytes);

    info!(listen = %config.listen, "daemon listening");
    axum::serve(tokio::net::TcpListener::bind(config.listen).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
