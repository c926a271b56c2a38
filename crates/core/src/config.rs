//! Configuration file model, fail-fast compilation, and snapshot publishing.
//!
//! The on-disk format is JSON:
//!
//! ```json
//! {
//!   "application": "C:\\Program Files\\Browser\\browser.exe",
//!   "port": 44525,
//!   "url_patterns": [
//!     { "pattern": "^https://mail\\.", "args": ["--open", "$url"], "url_params": { "x": "2" } }
//!   ]
//! }
//! ```
//!
//! A [`Config`] is immutable once built. Reloads build a new one and swap it
//! into the shared [`ConfigHandle`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::dispatch::PatternRule;
use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_PORT: u16 = 44525;

/// Raw file contents, as deserialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
	#[serde(default)]
	pub application: String,
	/// `0` or absent means [`DEFAULT_PORT`].
	#[serde(default)]
	pub port: u16,
	#[serde(default)]
	pub url_patterns: Vec<PatternSpec>,
}

/// One entry of `url_patterns` before compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternSpec {
	pub pattern: String,
	#[serde(default)]
	pub args: Vec<String>,
	#[serde(default)]
	pub url_params: BTreeMap<String, String>,
}

/// Validated configuration with compiled rules.
#[derive(Debug, Clone)]
pub struct Config {
	source: ConfigFile,
	rules: Vec<PatternRule>,
}

impl Config {
	/// Compiles every pattern. The first invalid one fails the whole config.
	pub fn from_file(source: ConfigFile) -> Result<Self, ConfigError> {
		if source.application.trim().is_empty() {
			return Err(ConfigError::MissingApplication);
		}

		let rules = source
			.url_patterns
			.iter()
			.enumerate()
			.map(|(index, spec)| {
				PatternRule::new(&spec.pattern, spec.args.clone(), spec.url_params.clone()).map_err(|source| ConfigError::Pattern {
					index,
					pattern: spec.pattern.clone(),
					source,
				})
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { source, rules })
	}

	pub fn parse(json: &str) -> Result<Self, ConfigError> {
		let file: ConfigFile = serde_json::from_str(json)?;
		Self::from_file(file)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::parse(&json)
	}

	pub fn application(&self) -> &str {
		&self.source.application
	}

	pub fn port(&self) -> u16 {
		if self.source.port == 0 { DEFAULT_PORT } else { self.source.port }
	}

	pub fn rules(&self) -> &[PatternRule] {
		&self.rules
	}

	pub fn source(&self) -> &ConfigFile {
		&self.source
	}

	/// Pretty JSON of the file contents, for startup and reload logs.
	pub fn to_pretty_json(&self) -> String {
		serde_json::to_string_pretty(&self.source).unwrap_or_else(|_| format!("{:?}", self.source))
	}
}

/// `config.json` next to the running executable.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
	let exe = std::env::current_exe().map_err(ConfigError::Locate)?;
	let dir = exe
		.parent()
		.ok_or_else(|| ConfigError::Locate(std::io::Error::other("executable path has no parent directory")))?;
	Ok(dir.join(CONFIG_FILE_NAME))
}

/// Shared, swappable pointer to the current configuration snapshot.
///
/// Readers clone the inner `Arc` under the read lock and drop the lock
/// immediately; the reloader swaps under the write lock. Neither side holds
/// the lock across a launch.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
	current: Arc<RwLock<Arc<Config>>>,
}

impl ConfigHandle {
	pub fn new(config: Config) -> Self {
		Self {
			current: Arc::new(RwLock::new(Arc::new(config))),
		}
	}

	pub fn snapshot(&self) -> Arc<Config> {
		Arc::clone(&self.current.read())
	}

	/// Publishes `config` and returns the snapshot it replaced.
	pub fn publish(&self, config: Config) -> Arc<Config> {
		let next = Arc::new(config);
		std::mem::replace(&mut *self.current.write(), next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"application": "app",
		"port": 8080,
		"url_patterns": [
			{ "pattern": "^https://mail\\..*", "args": ["--open", "$url"] },
			{ "pattern": "docs", "url_params": { "x": "2" } }
		]
	}"#;

	#[test]
	fn parses_and_compiles_rules_in_order() {
		let config = Config::parse(SAMPLE).unwrap();
		assert_eq!(config.application(), "app");
		assert_eq!(config.port(), 8080);
		assert_eq!(config.rules().len(), 2);
		assert_eq!(config.rules()[0].pattern(), "^https://mail\\..*");
		assert!(config.rules()[1].template().is_empty());
	}

	#[test]
	fn missing_port_uses_default() {
		let config = Config::parse(r#"{"application": "app"}"#).unwrap();
		assert_eq!(config.port(), DEFAULT_PORT);
		assert!(config.rules().is_empty());
	}

	#[test]
	fn invalid_pattern_fails_whole_load() {
		let json = r#"{
			"application": "app",
			"url_patterns": [
				{ "pattern": "^ok$" },
				{ "pattern": "(unclosed" }
			]
		}"#;
		match Config::parse(json) {
			Err(ConfigError::Pattern { index, pattern, .. }) => {
				assert_eq!(index, 1);
				assert_eq!(pattern, "(unclosed");
			}
			other => panic!("expected pattern error, got {other:?}"),
		}
	}

	#[test]
	fn empty_application_is_rejected() {
		assert!(matches!(Config::parse(r#"{"application": "  "}"#), Err(ConfigError::MissingApplication)));
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		assert!(matches!(Config::parse("{ not json"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn load_reports_missing_file_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.json");
		match Config::load(&path) {
			Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected read error, got {other:?}"),
		}
	}

	#[test]
	fn publish_swaps_without_touching_held_snapshots() {
		let handle = ConfigHandle::new(Config::parse(r#"{"application": "first"}"#).unwrap());
		let held = handle.snapshot();

		let previous = handle.publish(Config::parse(r#"{"application": "second"}"#).unwrap());

		assert_eq!(previous.application(), "first");
		assert_eq!(held.application(), "first");
		assert_eq!(handle.snapshot().application(), "second");
	}
}
