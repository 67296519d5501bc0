pub mod console;
pub mod controller;
pub mod engine;
pub mod mapping;
pub mod persistence;
pub mod platform;

#[cfg(test)]
mod testing;

use crate::controller::{GilrsDevice, InputDevice};
use crate::engine::tick_engine::{SharedDevice, SharedMapping, SharedPlatform};
use crate::engine::{EngineSettings, PollLoop, RuntimeMode};
use crate::persistence::config_store::ConfigStore;
use crate::persistence::persistence_worker::PersistenceWorker;
use crate::platform::uinput::UinputPlatform;
use crate::platform::Platform;
use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let store = ConfigStore::at_default_location()?;
    info!("Loading config from {}", store.path().display());
    let loaded = store.load().await?;
    if let Some(notice) = &loaded.notice {
        warn!("{}", notice);
    }

    let persistence = PersistenceWorker::spawn(store, loaded.mapping, loaded.sensitivity);
    let mode = Arc::new(RuntimeMode::new(loaded.sensitivity));
    let mapping: SharedMapping = Arc::new(RwLock::new(loaded.mapping));

    let device: Box<dyn InputDevice> = Box::new(
        GilrsDevice::create().map_err(|e| eyre!("Failed to set up controller input: {}", e))?,
    );
    let platform: Box<dyn Platform> = Box::new(
        UinputPlatform::new().map_err(|e| eyre!("Failed to set up input synthesis: {}", e))?,
    );
    let device: SharedDevice = Arc::new(Mutex::new(device));
    let platform: SharedPlatform = Arc::new(Mutex::new(platform));

    let (status_tx, status_rx) = mpsc::channel(100);
    let status_handle = tokio::spawn(console::report_status(status_rx, persistence.sender()));

    let mut poll_loop = PollLoop::new(
        device,
        platform,
        mapping,
        mode,
        status_tx,
        EngineSettings::default(),
    );

    // No controller at startup is fine, `reconnect` retries
    if let Err(e) = poll_loop.connect() {
        warn!("{}", e);
    }

    console::run_console(&mut poll_loop, persistence.sender()).await?;

    poll_loop.stop().await;
    drop(poll_loop);
    if let Err(e) = status_handle.await {
        warn!("Status reporter ended abnormally: {}", e);
    }
    persistence.shutdown().await;

    info!("Goodbye");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
