use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use openwith::watch::ConfigWatcher;
use openwith::{Config, ConfigHandle, Dispatcher, LaunchMode, launcher};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{CliError, Result};
use crate::server;

pub async fn run(config_path: PathBuf, port: Option<u16>, mode: LaunchMode) -> Result<()> {
	let config = Config::load(&config_path)?;
	let port = port.unwrap_or_else(|| config.port());

	info!(target = "openwith", version = env!("CARGO_PKG_VERSION"), ?mode, config = %config_path.display(), "starting");
	info!(target = "openwith", config = %config.to_pretty_json(), "loaded configuration");

	let handle = ConfigHandle::new(config);
	let dispatcher = Dispatcher::new(handle.clone(), launcher::for_mode(mode));
	info!(target = "openwith", launcher = dispatcher.launcher_name(), "launch backend selected");

	let (stop_tx, stop_rx) = watch::channel(false);
	let watcher = ConfigWatcher::new(config_path, handle);
	let watcher_task = tokio::spawn(watcher.run(wait_for_stop(stop_rx)));

	let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
	let listener = TcpListener::bind(addr).await.map_err(|source| CliError::Bind { port, source })?;
	info!(target = "openwith", %addr, "listening");

	let served = server::serve(listener, dispatcher, shutdown_signal()).await;

	let _ = stop_tx.send(true);
	if let Err(err) = watcher_task.await {
		warn!(target = "openwith.config", error = %err, "config watcher task failed");
	}
	info!(target = "openwith", "stopped");
	served
}

async fn wait_for_stop(mut rx: watch::Receiver<bool>) {
	let _ = rx.wait_for(|stopped| *stopped).await;
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!(target = "openwith", error = %err, "failed to listen for ctrl-c");
		std::future::pending::<()>().await;
	}
	info!(target = "openwith", "shutdown requested");
}
