//! The two entry points request handlers use: resolve a URL, launch a command.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::ConfigHandle;
use crate::dispatch::{Dispatch, dispatch};
use crate::error::LaunchError;
use crate::launcher::{LaunchReport, Launcher};
use crate::resolve::{ResolvedCommand, resolve};

/// A URL's dispatch result and the command it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	pub dispatch: Dispatch,
	pub command: ResolvedCommand,
}

/// Resolves URLs against the current configuration snapshot and launches
/// them with the backend selected at startup.
#[derive(Clone)]
pub struct Dispatcher {
	config: ConfigHandle,
	launcher: Arc<dyn Launcher>,
}

impl Dispatcher {
	pub fn new(config: ConfigHandle, launcher: Arc<dyn Launcher>) -> Self {
		Self { config, launcher }
	}

	pub fn config(&self) -> &ConfigHandle {
		&self.config
	}

	pub fn launcher_name(&self) -> &'static str {
		self.launcher.name()
	}

	/// Rules and application path come from one snapshot taken here, so a
	/// concurrent reload is either fully seen or not at all.
	pub fn resolve(&self, url: &str) -> Resolution {
		let config = self.config.snapshot();
		let dispatch = dispatch(url, config.rules());
		let command = resolve(dispatch.arguments.clone(), &dispatch.url, config.application());
		Resolution { dispatch, command }
	}

	/// Blocking; run on a worker thread. Failures are logged here with their
	/// stage and OS error before being returned.
	pub fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
		match self.launcher.launch(command) {
			Ok(report) => {
				info!(
					target = "openwith.launch",
					launcher = self.launcher.name(),
					pid = ?report.pid,
					session_id = ?report.session_id,
					"launch succeeded"
				);
				Ok(report)
			}
			Err(err) => {
				error!(
					target = "openwith.launch",
					launcher = self.launcher.name(),
					stage = %err.stage(),
					os_error = ?err.os_error_code(),
					error = %err,
					"launch failed"
				);
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;

	use super::*;
	use crate::config::Config;

	#[derive(Default)]
	struct RecordingLauncher {
		launched: Mutex<Vec<ResolvedCommand>>,
	}

	impl Launcher for RecordingLauncher {
		fn name(&self) -> &'static str {
			"recording"
		}

		fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
			self.launched.lock().push(command.clone());
			Ok(LaunchReport::default())
		}
	}

	fn dispatcher(json: &str) -> (Dispatcher, Arc<RecordingLauncher>) {
		let launcher = Arc::new(RecordingLauncher::default());
		let handle = ConfigHandle::new(Config::parse(json).unwrap());
		(Dispatcher::new(handle, launcher.clone()), launcher)
	}

	const MAIL_RULES: &str = r#"{
		"application": "app",
		"url_patterns": [
			{ "pattern": "^https://mail\\..*", "args": ["--open", "$url"] },
			{ "pattern": "^https://docs\\.", "args": ["$url"], "url_params": { "x": "2" } }
		]
	}"#;

	#[test]
	fn matching_rule_resolves_templated_command() {
		let (dispatcher, _) = dispatcher(MAIL_RULES);

		let resolution = dispatcher.resolve("https://mail.example.com/?x=1");

		assert_eq!(resolution.command.to_string(), "app --open https://mail.example.com/?x=1");
		assert_eq!(resolution.dispatch.rule, Some(0));
	}

	#[test]
	fn unmatched_url_resolves_to_bare_url() {
		let (dispatcher, _) = dispatcher(MAIL_RULES);

		let resolution = dispatcher.resolve("https://other.example.com/");

		assert!(resolution.dispatch.arguments.is_empty());
		assert_eq!(resolution.command.to_string(), "app https://other.example.com/");
	}

	#[test]
	fn rewritten_query_flows_into_command() {
		let (dispatcher, _) = dispatcher(MAIL_RULES);

		let resolution = dispatcher.resolve("https://docs.example.com/a?x=1&y=3");

		assert_eq!(resolution.command.arguments, vec!["https://docs.example.com/a?x=2&y=3"]);
	}

	#[test]
	fn resolving_twice_is_identical() {
		let (dispatcher, _) = dispatcher(MAIL_RULES);

		assert_eq!(dispatcher.resolve("https://docs.example.com/?x=1"), dispatcher.resolve("https://docs.example.com/?x=1"));
	}

	#[test]
	fn resolution_follows_published_config() {
		let (dispatcher, _) = dispatcher(MAIL_RULES);
		dispatcher
			.config()
			.publish(Config::parse(r#"{"application": "other-app"}"#).unwrap());

		let resolution = dispatcher.resolve("https://mail.example.com/");

		assert_eq!(resolution.command.executable, "other-app");
		assert_eq!(resolution.dispatch.rule, None);
	}

	#[test]
	fn launch_goes_through_selected_backend() {
		let (dispatcher, launcher) = dispatcher(MAIL_RULES);
		let resolution = dispatcher.resolve("https://mail.example.com/");

		dispatcher.launch(&resolution.command).unwrap();

		assert_eq!(dispatcher.launcher_name(), "recording");
		assert_eq!(launcher.launched.lock().as_slice(), &[resolution.command]);
	}
}
