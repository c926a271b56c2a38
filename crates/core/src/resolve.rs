//! Final executable + argument list for a dispatched URL.

use std::fmt;

use serde::Serialize;

/// Executable and arguments for exactly one launch. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCommand {
	pub executable: String,
	pub arguments: Vec<String>,
}

impl ResolvedCommand {
	/// Command line for process-creation APIs that take a single string:
	/// the executable quoted, arguments joined by single spaces.
	///
	/// Arguments are not escaped; callers must not rely on embedded quotes
	/// or whitespace surviving the target's own parsing.
	pub fn command_line(&self) -> String {
		let mut line = format!("\"{}\"", self.executable);
		if !self.arguments.is_empty() {
			line.push(' ');
			line.push_str(&self.arguments.join(" "));
		}
		line
	}
}

impl fmt::Display for ResolvedCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.executable)?;
		for arg in &self.arguments {
			write!(f, " {arg}")?;
		}
		Ok(())
	}
}

/// Uses `arguments` verbatim when non-empty, otherwise `[url]`.
pub fn resolve(arguments: Vec<String>, url: &str, application: &str) -> ResolvedCommand {
	let arguments = if arguments.is_empty() { vec![url.to_string()] } else { arguments };
	ResolvedCommand {
		executable: application.to_string(),
		arguments,
	}
}
