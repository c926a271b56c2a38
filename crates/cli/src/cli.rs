use std::convert::Infallible;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use openwith::LaunchMode;

#[derive(Parser, Debug)]
#[command(name = "openwith")]
#[command(about = "Open URLs posted to a loopback endpoint with a configured application")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Configuration file (defaults to config.json next to the executable)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Running under the service manager: launch into the interactive user
	/// session and log to file only. `SERVICE_MODE=true` has the same effect;
	/// any other value leaves interactive mode on.
	#[arg(long, global = true, env = "SERVICE_MODE", value_parser = service_mode_value)]
	pub service_mode: bool,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

impl Cli {
	pub fn launch_mode(&self) -> LaunchMode {
		if self.service_mode { LaunchMode::Service } else { LaunchMode::Interactive }
	}
}

/// Only the exact value `true` selects service mode.
fn service_mode_value(value: &str) -> Result<bool, Infallible> {
	Ok(value == "true")
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
	/// Run the HTTP endpoint (default)
	Serve {
		/// Listen on this port instead of the configured one
		#[arg(short, long)]
		port: Option<u16>,
	},

	/// Validate the configuration and print a summary
	Check,

	/// Show the command a URL would launch, without launching it
	Resolve { url: String },
}
