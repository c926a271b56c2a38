//! First-match URL pattern dispatch.
//!
//! Rules are tried in declaration order against the raw URL. The first match
//! rewrites selected query parameters and expands its argument template; no
//! match leaves the URL alone and yields no arguments.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use tracing::debug;
use url::Url;


/// Token replaced by the (rewritten) URL inside argument templates.
pub const URL_PLACEHOLDER: &str = "$url";

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// A compiled `url_patterns` entry.
#[derive(Debug, Clone)]
pub struct PatternRule {
	matcher: Regex,
	template: Vec<String>,
	rewrites: BTreeMap<String, String>,
}

impl PatternRule {
	pub fn new(pattern: &str, template: Vec<String>, rewrites: BTreeMap<String, String>) -> Result<Self, regex::Error> {
		Ok(Self {
			matcher: Regex::new(pattern)?,
			template,
			rewrites,
		})
	}

	pub fn pattern(&self) -> &str {
		self.matcher.as_str()
	}

	pub fn template(&self) -> &[String] {
		&self.template
	}

	pub fn rewrites(&self) -> &BTreeMap<String, String> {
		&self.rewrites
	}

	pub fn is_match(&self, url: &str) -> bool {
		self.matcher.is_match(url)
	}
}

/// Outcome of matching one URL against the rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
	/// Index of the rule that matched.
	pub rule: Option<usize>,
	/// Expanded template of the matching rule; empty when nothing matched.
	pub arguments: Vec<String>,
	/// URL after query rewriting; the raw URL when nothing matched.
	pub url: String,
}

impl Dispatch {
	fn unmatched(url: &str) -> Self {
		Self {
			rule: None,
			arguments: Vec::new(),
			url: url.to_string(),
		}
	}
}

/// Matches `url` against `rules`, first match wins.
pub fn dispatch(url: &str, rules: &[PatternRule]) -> Dispatch {
	let Some((index, rule)) = rules.iter().enumerate().find(|(_, rule)| rule.is_match(url)) else {
		return Dispatch::unmatched(url);
	};

	let rewritten = rewrite_query(url, rule.rewrites());
	let arguments = expand_template(rule.template(), &rewritten);
	debug!(target = "openwith.dispatch", rule = index, pattern = rule.pattern(), %rewritten, "url matched");

	Dispatch {
		rule: Some(index),
		arguments,
		url: rewritten,
	}
}

/// Replaces the values of query keys that appear in both `url` and
/// `rewrites`. Keys missing from the URL are never added, and a repeated
/// rewritten key collapses to one pair.
///
/// Pairs are stably sorted by decoded key. Pairs that are not rewritten keep
/// their raw text, so values in any byte encoding survive unchanged. An empty
/// `rewrites` map or an unparseable URL returns `url` unchanged.
pub fn rewrite_query(url: &str, rewrites: &BTreeMap<String, String>) -> String {
	if rewrites.is_empty() {
		return url.to_string();
	}

	let mut parsed = match Url::parse(url) {
		Ok(parsed) => parsed,
		Err(err) => {
			debug!(target = "openwith.dispatch", %url, error = %err, "url not parseable; skipping query rewrite");
			return url.to_string();
		}
	};
	let Some(query) = parsed.query() else {
		return parsed.to_string();
	};

	let mut pairs: Vec<(Vec<u8>, String)> = Vec::new();
	for segment in query.split('&').filter(|segment| !segment.is_empty()) {
		let raw_key = segment.split_once('=').map_or(segment, |(key, _)| key);
		let key = decode_component(raw_key);
		let replacement = std::str::from_utf8(&key).ok().and_then(|key| rewrites.get(key));
		match replacement {
			Some(_) if pairs.iter().any(|(seen, _)| *seen == key) => {}
			Some(value) => {
				let pair = format!("{raw_key}={}", encode_component(value));
				pairs.push((key, pair));
			}
			None => pairs.push((key, segment.to_string())),
		}
	}
	pairs.sort_by(|a, b| a.0.cmp(&b.0));

	if pairs.is_empty() {
		parsed.set_query(None);
	} else {
		let joined = pairs.into_iter().map(|(_, pair)| pair).collect::<Vec<_>>().join("&");
		parsed.set_query(Some(&joined));
	}
	parsed.to_string()
}

/// Query component bytes, with `+` read as a space.
fn decode_component(raw: &str) -> Vec<u8> {
	percent_decode_str(&raw.replace('+', " ")).collect()
}

/// Escapes everything but `A-Z a-z 0-9 - _ . ~`; spaces become `+`.
fn encode_component(value: &str) -> String {
	value
		.split(' ')
		.map(|part| utf8_percent_encode(part, QUERY_VALUE).to_string())
		.collect::<Vec<_>>()
		.join("+")
}

/// Substitutes every [`URL_PLACEHOLDER`] in every template token.
pub fn expand_template(template: &[String], url: &str) -> Vec<String> {
	template.iter().map(|token| token.replace(URL_PLACEHOLDER, url)).collect()
}
