use std::sync::{Arc, LazyLock};

use upload_metadata::{ExpirySweeper, SqlMetadataBackend, constants};

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let backend = SqlMetadataBackend::connect(&ENV.metadata).await.map_err(|err| {
        log::error!("Unable to open metadata backend: {}", err);
        std::io::Error::other("Database connection error")
    })?;

    backend.health_check().await.map_err(|err| {
        log::error!("Metadata backend health check failed: {}", err);
        std::io::Error::other("Database health check error")
    })?;

    let sweeper = ExpirySweeper::with_dependencies(Arc::new(backend));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
    let task = tokio::spawn(sweeper.run(ENV.sweep_interval, stop_rx));

    tokio::signal::ctrl_c().await?;
    log::info!("Shutdown requested");
    stop_tx.send(()).ok();
    task.await.ok();

    Ok(())
}
