use std::io;

use openwith::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("config error: {0}")]
	Config(#[from] ConfigError),

	#[error("failed to listen on 127.0.0.1:{port}: {source}")]
	Bind {
		port: u16,
		#[source]
		source: io::Error,
	},

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
