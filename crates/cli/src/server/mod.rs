//! `POST /` endpoint: open a URL with the configured application.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use openwith::Dispatcher;
use openwith_protocol::{ErrorResponse, OpenRequest, OpenResponse};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::{CliError, Result};

pub const INVALID_JSON: &str = "Invalid JSON";
pub const URL_REQUIRED: &str = "URL parameter is required";

pub fn router(dispatcher: Dispatcher) -> Router {
	Router::new().route("/", post(open_url)).with_state(dispatcher)
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(listener: TcpListener, dispatcher: Dispatcher, shutdown: F) -> Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	axum::serve(listener, router(dispatcher))
		.with_graceful_shutdown(shutdown)
		.await
		.context("http server stopped with an error")
		.map_err(CliError::from)
}

/// The body is parsed regardless of `Content-Type`.
async fn open_url(State(dispatcher): State<Dispatcher>, body: Bytes) -> std::result::Result<Json<OpenResponse>, ApiError> {
	let request: OpenRequest = serde_json::from_slice(&body).map_err(|err| {
		debug!(target = "openwith.http", error = %err, "rejected request body");
		ApiError::bad_request(INVALID_JSON)
	})?;

	info!(target = "openwith.http", url = %request.url, "open requested");
	if request.url.trim().is_empty() {
		return Err(ApiError::bad_request(URL_REQUIRED));
	}

	let resolution = dispatcher.resolve(&request.url);
	info!(
		target = "openwith.http",
		rule = ?resolution.dispatch.rule,
		command = %resolution.command,
		"resolved command"
	);

	let command = resolution.command.clone();
	let launcher = dispatcher.clone();
	tokio::task::spawn_blocking(move || launcher.launch(&command))
		.await
		.map_err(|err| ApiError::launch_failed(format!("launch task failed: {err}")))?
		.map_err(|err| ApiError::launch_failed(err.to_string()))?;

	Ok(Json(OpenResponse::opened(
		request.url,
		resolution.command.executable,
		resolution.dispatch.arguments,
	)))
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}

impl ApiError {
	fn bad_request(message: &str) -> Self {
		Self {
			status: StatusCode::BAD_REQUEST,
			message: message.to_string(),
		}
	}

	fn launch_failed(reason: String) -> Self {
		Self {
			status: StatusCode::INTERNAL_SERVER_ERROR,
			message: format!("Cannot start application: {reason}"),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorResponse::new(self.message))).into_response()
	}
}
