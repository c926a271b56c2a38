//! Polling reload of the configuration file.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigHandle};

pub const RELOAD_INTERVAL: Duration = Duration::from_secs(5);

/// Result of a single [`ConfigWatcher::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
	Unchanged,
	Reloaded,
	/// The file changed but did not load; the previous snapshot stays.
	Rejected,
}

/// Reloads the config file when its modification time moves forward.
#[derive(Debug)]
pub struct ConfigWatcher {
	path: PathBuf,
	handle: ConfigHandle,
	interval: Duration,
	last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
	pub fn new(path: PathBuf, handle: ConfigHandle) -> Self {
		let last_modified = modified(&path);
		Self {
			path,
			handle,
			interval: RELOAD_INTERVAL,
			last_modified,
		}
	}

	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn poll(&mut self) -> ReloadOutcome {
		let Some(current) = modified(&self.path) else {
			return ReloadOutcome::Unchanged;
		};
		if self.last_modified.is_some_and(|last| current <= last) {
			return ReloadOutcome::Unchanged;
		}
		self.last_modified = Some(current);

		info!(target = "openwith.config", path = %self.path.display(), "config file changed, reloading");
		match Config::load(&self.path) {
			Ok(config) => {
				let next_port = config.port();
				let json = config.to_pretty_json();
				let previous = self.handle.publish(config);
				if previous.port() != next_port {
					warn!(
						target = "openwith.config",
						listening = previous.port(),
						configured = next_port,
						"port changed; restart to listen on the new port"
					);
				}
				info!(target = "openwith.config", config = %json, "config reloaded successfully");
				ReloadOutcome::Reloaded
			}
			Err(err) => {
				warn!(target = "openwith.config", error = %err, "failed to reload config; keeping previous");
				ReloadOutcome::Rejected
			}
		}
	}

	/// Polls every interval until `shutdown` resolves.
	pub async fn run<F>(mut self, shutdown: F)
	where
		F: Future<Output = ()>,
	{
		let mut ticker = tokio::time::interval(self.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		ticker.tick().await;
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				_ = &mut shutdown => break,
				_ = ticker.tick() => {
					self.poll();
				}
			}
		}
		debug!(target = "openwith.config", "config watcher stopped");
	}
}

fn modified(path: &Path) -> Option<SystemTime> {
	std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	fn write_config(path: &Path, json: &str, modified: SystemTime) {
		fs::write(path, json).unwrap();
		fs::File::options().write(true).open(path).unwrap().set_modified(modified).unwrap();
	}

	fn setup(json: &str) -> (tempfile::TempDir, PathBuf, ConfigHandle, SystemTime) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		let start = SystemTime::now() - Duration::from_secs(600);
		write_config(&path, json, start);
		let handle = ConfigHandle::new(Config::load(&path).unwrap());
		(dir, path, handle, start)
	}

	#[test]
	fn untouched_file_is_unchanged() {
		let (_dir, path, handle, _) = setup(r#"{"application": "first"}"#);
		let mut watcher = ConfigWatcher::new(path, handle);

		assert_eq!(watcher.poll(), ReloadOutcome::Unchanged);
	}

	#[test]
	fn newer_file_is_published() {
		let (_dir, path, handle, start) = setup(r#"{"application": "first"}"#);
		let mut watcher = ConfigWatcher::new(path.clone(), handle.clone());

		write_config(&path, r#"{"application": "second"}"#, start + Duration::from_secs(10));

		assert_eq!(watcher.poll(), ReloadOutcome::Reloaded);
		assert_eq!(handle.snapshot().application(), "second");
		assert_eq!(watcher.poll(), ReloadOutcome::Unchanged);
	}

	#[test]
	fn broken_file_keeps_previous_snapshot() {
		let (_dir, path, handle, start) = setup(r#"{"application": "first"}"#);
		let mut watcher = ConfigWatcher::new(path.clone(), handle.clone());

		write_config(
			&path,
			r#"{"application": "second", "url_patterns": [{"pattern": "("}]}"#,
			start + Duration::from_secs(10),
		);

		assert_eq!(watcher.poll(), ReloadOutcome::Rejected);
		assert_eq!(handle.snapshot().application(), "first");
		assert_eq!(watcher.poll(), ReloadOutcome::Unchanged);
	}

	#[test]
	fn deleted_file_is_ignored() {
		let (_dir, path, handle, _) = setup(r#"{"application": "first"}"#);
		let mut watcher = ConfigWatcher::new(path.clone(), handle.clone());

		fs::remove_file(&path).unwrap();

		assert_eq!(watcher.poll(), ReloadOutcome::Unchanged);
		assert_eq!(handle.snapshot().application(), "first");
	}

	#[tokio::test]
	async fn run_stops_on_shutdown() {
		let (_dir, path, handle, _) = setup(r#"{"application": "first"}"#);
		let watcher = ConfigWatcher::new(path, handle).with_interval(Duration::from_millis(10));
		let (tx, rx) = tokio::sync::oneshot::channel::<()>();

		let task = tokio::spawn(watcher.run(async {
			let _ = rx.await;
		}));
		tx.send(()).unwrap();

		tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
	}
}
