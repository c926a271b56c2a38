mod check;
mod resolve;
mod serve;

use openwith::config::default_config_path;

use crate::cli::{Cli, Commands};
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config_path = match cli.config.clone() {
		Some(path) => path,
		None => default_config_path()?,
	};
	let mode = cli.launch_mode();

	match cli.command.unwrap_or(Commands::Serve { port: None }) {
		Commands::Serve { port } => serve::run(config_path, port, mode).await?,
		Commands::Check => check::run(&config_path)?,
		Commands::Resolve { url } => resolve::run(&config_path, &url)?,
	}

	Ok(())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
