//! Tracing subscriber setup.
//!
//! The server logs to stdout and appends to `application.log` next to the
//! executable. Under the service manager there is no console, so only the
//! file is written unless it cannot be opened, in which case lines go to
//! stderr instead. `check` and `resolve` print JSON on stdout and log to
//! stderr.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE_NAME: &str = "application.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
	Stdout,
	Stderr,
}

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOutput {
	pub console: Option<Console>,
	pub file: Option<PathBuf>,
}

impl LogOutput {
	pub fn console_only() -> Self {
		Self {
			console: Some(Console::Stderr),
			file: None,
		}
	}

	/// Server output: the log file, plus stdout unless running as a service.
	pub fn server(service_mode: bool) -> Self {
		Self {
			console: (!service_mode).then_some(Console::Stdout),
			file: default_log_path(),
		}
	}
}

/// `application.log` next to the running executable.
pub fn default_log_path() -> Option<PathBuf> {
	let exe = std::env::current_exe().ok()?;
	Some(exe.parent()?.join(LOG_FILE_NAME))
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from info.
pub fn default_directive(verbose: u8) -> &'static str {
	match verbose {
		0 => "info",
		1 => "debug",
		_ => "trace",
	}
}

/// A run that asked for no console but lost its file still logs to stderr.
fn effective_console(requested: Option<Console>, file_opened: bool) -> Option<Console> {
	match requested {
		None if !file_opened => Some(Console::Stderr),
		requested => requested,
	}
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file lines are flushed.
pub fn init_logging(verbose: u8, output: &LogOutput) -> Option<WorkerGuard> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

	let appender = output.file.as_deref().map(|path| (path, file_appender(path)));
	let (file, guard, file_error) = match appender {
		Some((_, Ok(appender))) => {
			let (writer, guard) = tracing_appender::non_blocking(appender);
			let layer = fmt::layer()
				.with_writer(writer)
				.with_ansi(false)
				.with_file(true)
				.with_line_number(true)
				.with_target(false);
			(Some(layer), Some(guard), None)
		}
		Some((path, Err(err))) => (None, None, Some((path, err))),
		None => (None, None, None),
	};

	let console = effective_console(output.console, file.is_some()).map(|console| {
		let writer = match console {
			Console::Stdout => BoxMakeWriter::new(io::stdout),
			Console::Stderr => BoxMakeWriter::new(io::stderr),
		};
		fmt::layer().with_writer(writer).with_target(false)
	});

	let _ = tracing_subscriber::registry().with(filter).with(console).with(file).try_init();

	if let Some((path, err)) = file_error {
		warn!(target = "openwith", path = %path.display(), error = %err, "failed to open log file");
	}
	guard
}

fn file_appender(path: &Path) -> io::Result<RollingFileAppender> {
	let (Some(dir), Some(name)) = (path.parent(), path.file_name().and_then(|name| name.to_str())) else {
		return Err(io::Error::other("log path has no directory or file name"));
	};
	RollingFileAppender::builder()
		.rotation(Rotation::NEVER)
		.filename_prefix(name)
		.build(dir)
		.map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_raises_level() {
		assert_eq!(default_directive(0), "info");
		assert_eq!(default_directive(1), "debug");
		assert_eq!(default_directive(5), "trace");
	}

	#[test]
	fn interactive_server_logs_to_stdout_and_file() {
		let output = LogOutput::server(false);
		assert_eq!(output.console, Some(Console::Stdout));
		assert!(output.file.is_some_and(|path| path.ends_with(LOG_FILE_NAME)));
	}

	#[test]
	fn service_mode_logs_to_file_only() {
		let output = LogOutput::server(true);
		assert_eq!(output.console, None);
		assert!(output.file.is_some_and(|path| path.ends_with(LOG_FILE_NAME)));
	}

	#[test]
	fn one_shot_commands_keep_stdout_for_output() {
		assert_eq!(LogOutput::console_only().console, Some(Console::Stderr));
	}

	#[test]
	fn lost_log_file_falls_back_to_stderr() {
		assert_eq!(effective_console(None, false), Some(Console::Stderr));
		assert_eq!(effective_console(None, true), None);
		assert_eq!(effective_console(Some(Console::Stdout), false), Some(Console::Stdout));
	}

	#[test]
	fn unwritable_log_dir_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let blocker = dir.path().join("not-a-dir");
		std::fs::write(&blocker, "").unwrap();
		assert!(file_appender(&blocker.join(LOG_FILE_NAME)).is_err());
	}
}
