use tracing::warn;

use crate::error::LaunchError;
use crate::launcher::{LaunchReport, Launcher};
use crate::resolve::ResolvedCommand;

/// Service-mode launcher on platforms without a session manager to cross.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLauncher;

impl Launcher for UnsupportedLauncher {
	fn name(&self) -> &'static str {
		"unsupported"
	}

	fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
		warn!(target = "openwith.session", %command, "cross-session launch requested on an unsupported platform");
		Err(LaunchError::Unsupported)
	}
}
