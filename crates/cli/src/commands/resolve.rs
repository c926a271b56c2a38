use std::path::Path;

use openwith::dispatch::dispatch;
use openwith::resolve::resolve;
use openwith::Config;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
	url: &'a str,
	rewritten_url: &'a str,
	/// Index into `url_patterns` of the rule that matched.
	rule: Option<usize>,
	executable: &'a str,
	args: &'a [String],
	command_line: String,
}

/// Dry run: prints the command `url` would launch without starting it.
pub fn run(path: &Path, url: &str) -> Result<()> {
	let config = Config::load(path)?;
	let matched = dispatch(url, config.rules());
	let command = resolve(matched.arguments.clone(), &matched.url, config.application());

	super::print_json(&ResolveOutput {
		url,
		rewritten_url: &matched.url,
		rule: matched.rule,
		executable: &command.executable,
		args: &command.arguments,
		command_line: command.command_line(),
	})
}
