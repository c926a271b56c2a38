use std::path::Path;

use openwith::Config;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct CheckSummary<'a> {
	config: String,
	application: &'a str,
	port: u16,
	rules: Vec<RuleSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct RuleSummary<'a> {
	pattern: &'a str,
	args: &'a [String],
	url_params: Vec<&'a str>,
}

/// Loads and compiles the configuration, then prints what it contains.
pub fn run(path: &Path) -> Result<()> {
	let config = Config::load(path)?;
	let summary = CheckSummary {
		config: path.display().to_string(),
		application: config.application(),
		port: config.port(),
		rules: config
			.rules()
			.iter()
			.map(|rule| RuleSummary {
				pattern: rule.pattern(),
				args: rule.template(),
				url_params: rule.rewrites().keys().map(String::as_str).collect(),
			})
			.collect(),
	};
	super::print_json(&summary)
}
