//! Direct launch in the caller's own session.

use std::process::{Command, Stdio};

use tracing::{info, warn};

use super::output::decode_output;
use super::{LaunchReport, Launcher};
use crate::error::LaunchError;
use crate::resolve::ResolvedCommand;

/// Runs the command as a child of this process and waits for it, capturing
/// stdout and stderr for the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLauncher;

impl Launcher for LocalLauncher {
	fn name(&self) -> &'static str {
		"local"
	}

	fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
		info!(target = "openwith.launch", %command, "executing command");

		let output = Command::new(&command.executable)
			.args(&command.arguments)
			.stdin(Stdio::null())
			.output()
			.map_err(|source| LaunchError::LocalStart {
				executable: command.executable.clone(),
				source,
			})?;

		let mut combined = decode_output(&output.stdout);
		combined.push_str(&decode_output(&output.stderr));

		if !output.status.success() {
			warn!(target = "openwith.launch", status = %output.status, output = %combined, "command exited unsuccessfully");
			return Err(LaunchError::LocalExit {
				executable: command.executable.clone(),
				status: output.status,
				output: combined,
			});
		}

		if combined.is_empty() {
			info!(target = "openwith.launch", "command executed successfully");
		} else {
			info!(target = "openwith.launch", output = %combined, "command executed successfully");
		}

		Ok(LaunchReport {
			output: Some(combined),
			..LaunchReport::default()
		})
	}
}
