use serde::{Deserialize, Serialize};

/// Message returned with every successful open.
pub const OPENED_MESSAGE: &str = "URL opened successfully";

/// Body of `POST /`.
///
/// `url` defaults to empty so that `{}` deserializes and is rejected by
/// validation rather than by the JSON layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
	#[serde(default)]
	pub url: String,
}

/// Successful open response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponse {
	pub message: String,
	/// The URL exactly as received.
	pub url: String,
	/// Application path from the configuration snapshot used for this request.
	pub application: String,
	/// Arguments produced by the matching rule; empty when no rule matched.
	pub args: Vec<String>,
}

impl OpenResponse {
	pub fn opened(url: impl Into<String>, application: impl Into<String>, args: Vec<String>) -> Self {
		Self {
			message: OPENED_MESSAGE.to_string(),
			url: url.into(),
			application: application.into(),
			args,
		}
	}
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>) -> Self {
		Self { error: error.into() }
	}
}
