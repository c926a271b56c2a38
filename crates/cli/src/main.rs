use clap::Parser;
use openwith_cli::cli::{Cli, Commands};
use openwith_cli::{commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	let output = match cli.command {
		None | Some(Commands::Serve { .. }) => logging::LogOutput::server(cli.service_mode),
		Some(_) => logging::LogOutput::console_only(),
	};
	let guard = logging::init_logging(cli.verbose, &output);

	if let Err(err) = commands::dispatch(cli).await {
		error!(target = "openwith", error = %err, "command failed");
		drop(guard);
		std::process::exit(1);
	}
}
