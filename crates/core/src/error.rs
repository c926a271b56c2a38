//! Error types for configuration loading and launching.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure to produce a usable [`Config`](crate::config::Config).
///
/// Any of these aborts the whole load; no partially compiled configuration is
/// ever published.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot locate the executable directory: {0}")]
	Locate(#[source] io::Error),

	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("invalid config JSON: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("`application` must name an executable")]
	MissingApplication,

	#[error("url_patterns[{index}]: `{pattern}` is not a valid regular expression: {source}")]
	Pattern {
		index: usize,
		pattern: String,
		#[source]
		source: regex::Error,
	},
}

/// Stage of a launch attempt that produced a [`LaunchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchStage {
	SessionDiscovery,
	TokenAcquisition,
	TokenDuplication,
	EnvironmentBlock,
	ProcessCreation,
	LocalStart,
	LocalExit,
	Unsupported,
}

impl LaunchStage {
	pub fn as_str(self) -> &'static str {
		match self {
			LaunchStage::SessionDiscovery => "session discovery",
			LaunchStage::TokenAcquisition => "token acquisition",
			LaunchStage::TokenDuplication => "duplication",
			LaunchStage::EnvironmentBlock => "environment block",
			LaunchStage::ProcessCreation => "process creation",
			LaunchStage::LocalStart => "local start",
			LaunchStage::LocalExit => "local exit",
			LaunchStage::Unsupported => "unsupported",
		}
	}
}

impl fmt::Display for LaunchStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A launch attempt failed. Each variant names the stage that failed; OS
/// errors are carried as [`io::Error`] so their raw codes survive into logs.
#[derive(Debug, Error)]
pub enum LaunchError {
	#[error("no active user session found")]
	NoActiveSession,

	#[error("failed to enumerate sessions: {0}")]
	SessionEnumeration(#[source] io::Error),

	#[error("failed to obtain the user token for session {session_id}: {source}")]
	TokenAcquisition {
		session_id: u32,
		#[source]
		source: io::Error,
	},

	#[error("failed to duplicate the user token: {0}")]
	TokenDuplication(#[source] io::Error),

	#[error("failed to create the user environment block: {0}")]
	EnvironmentBlock(#[source] io::Error),

	#[error("failed to create the process in session {session_id}: {source}")]
	ProcessCreation {
		session_id: u32,
		#[source]
		source: io::Error,
	},

	#[error("failed to start {executable}: {source}")]
	LocalStart {
		executable: String,
		#[source]
		source: io::Error,
	},

	#[error("{executable} exited with {status}")]
	LocalExit {
		executable: String,
		status: ExitStatus,
		output: String,
	},

	#[error("launching into the interactive user session is not supported on this platform")]
	Unsupported,
}

impl LaunchError {
	pub fn stage(&self) -> LaunchStage {
		match self {
			LaunchError::NoActiveSession | LaunchError::SessionEnumeration(_) => LaunchStage::SessionDiscovery,
			LaunchError::TokenAcquisition { .. } => LaunchStage::TokenAcquisition,
			LaunchError::TokenDuplication(_) => LaunchStage::TokenDuplication,
			LaunchError::EnvironmentBlock(_) => LaunchStage::EnvironmentBlock,
			LaunchError::ProcessCreation { .. } => LaunchStage::ProcessCreation,
			LaunchError::LocalStart { .. } => LaunchStage::LocalStart,
			LaunchError::LocalExit { .. } => LaunchStage::LocalExit,
			LaunchError::Unsupported => LaunchStage::Unsupported,
		}
	}

	/// Raw OS error code of the failing call, when there is one.
	pub fn os_error_code(&self) -> Option<i32> {
		match self {
			LaunchError::SessionEnumeration(source)
			| LaunchError::TokenAcquisition { source, .. }
			| LaunchError::TokenDuplication(source)
			| LaunchError::EnvironmentBlock(source)
			| LaunchError::ProcessCreation { source, .. }
			| LaunchError::LocalStart { source, .. } => source.raw_os_error(),
			LaunchError::NoActiveSession | LaunchError::LocalExit { .. } | LaunchError::Unsupported => None,
		}
	}
}
