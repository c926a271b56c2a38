//! Launch backends behind one capability interface.
//!
//! The backend is chosen once at startup from [`LaunchMode`]; request paths
//! only ever see `Arc<dyn Launcher>`. No backend falls back to another.

use std::sync::Arc;

use crate::error::LaunchError;
use crate::resolve::ResolvedCommand;

mod local;
mod output;
pub mod session;

pub use local::LocalLauncher;
pub use output::decode_output;

/// Whether this process runs interactively or as a background service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
	#[default]
	Interactive,
	Service,
}

/// What a successful launch reports back for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchReport {
	pub pid: Option<u32>,
	pub session_id: Option<u32>,
	/// Combined stdout/stderr, for launches that wait on the child.
	pub output: Option<String>,
}

/// Starts a resolved command. Implementations block the calling thread for
/// the duration of their OS calls and must be run off the async runtime.
pub trait Launcher: Send + Sync {
	fn name(&self) -> &'static str;

	fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError>;
}

/// Picks the backend for `mode` on the current platform.
pub fn for_mode(mode: LaunchMode) -> Arc<dyn Launcher> {
	match mode {
		LaunchMode::Interactive => Arc::new(LocalLauncher),
		LaunchMode::Service => session::platform_launcher(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interactive_mode_uses_local_launcher() {
		assert_eq!(for_mode(LaunchMode::Interactive).name(), "local");
	}

	#[cfg(not(windows))]
	#[test]
	fn service_mode_off_windows_is_unsupported() {
		let launcher = for_mode(LaunchMode::Service);
		let command = ResolvedCommand {
			executable: "app".into(),
			arguments: vec!["https://a.test/".into()],
		};
		assert!(matches!(launcher.launch(&command), Err(LaunchError::Unsupported)));
	}
}
