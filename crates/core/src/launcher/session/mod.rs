//! Launching into the interactive user's session from a service context.
//!
//! A service runs in session 0 with no visible desktop. To put a window in
//! front of the logged-in user, the launcher finds the active console
//! session, borrows that user's token, builds the user's environment, and
//! creates the process with that token on the user's desktop.
//!
//! The OS calls sit behind [`SessionApi`] so the acquisition and release
//! ordering in [`bridge`] and [`directory`] is independent of the platform
//! binding. Every acquired handle is owned by a guard that releases it on
//! drop; guards are nested so release runs in reverse acquisition order.

use std::io;
use std::sync::Arc;

use tracing::info;

use super::{LaunchReport, Launcher};
use crate::error::LaunchError;
use crate::resolve::ResolvedCommand;

pub mod bridge;
pub mod directory;
#[cfg(not(windows))]
mod unsupported;
#[cfg(windows)]
mod windows;


pub use bridge::{EnvironmentGuard, TokenGuard, UserContext, acquire};
pub use directory::{SessionHandle, find_active_session};
#[cfg(not(windows))]
pub use unsupported::UnsupportedLauncher;
#[cfg(windows)]
pub use windows::WtsSessionApi;

/// OS primitives needed to start a process in another session.
///
/// `Token` and `Environment` are raw OS handles. Implementations must not
/// release them on their own; [`TokenGuard`] and [`EnvironmentGuard`] call
/// the matching release method exactly once.
pub trait SessionApi {
	type Token: Copy;
	type Environment: Copy;

	/// Snapshot of all sessions known to the session manager. Any buffer the
	/// OS allocates for the enumeration is freed before this returns.
	fn enumerate_sessions(&self) -> io::Result<Vec<SessionHandle>>;

	/// Token of the user logged on to `session_id`.
	fn query_user_token(&self, session_id: u32) -> io::Result<Self::Token>;

	/// Primary token with full access derived from `token`.
	fn duplicate_primary_token(&self, token: Self::Token) -> io::Result<Self::Token>;

	/// Environment block of the user `token` belongs to.
	fn create_environment_block(&self, token: Self::Token) -> io::Result<Self::Environment>;

	/// Starts `command_line` on the interactive desktop of `session_id` and
	/// returns the new process id. Process and thread handles are closed
	/// before returning; the child keeps running.
	fn create_process(&self, token: Self::Token, environment: Self::Environment, session_id: u32, command_line: &str) -> io::Result<u32>;

	fn close_token(&self, token: Self::Token);

	fn destroy_environment_block(&self, environment: Self::Environment);
}

/// Launches into the active interactive session through a [`SessionApi`].
#[derive(Debug, Clone, Default)]
pub struct CrossSessionLauncher<A> {
	api: A,
}

impl<A: SessionApi> CrossSessionLauncher<A> {
	pub fn new(api: A) -> Self {
		Self { api }
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	/// Fire-and-forget launch of `command` as the active session's user.
	///
	/// Session and token state is rediscovered on every call; the active
	/// session can change between requests.
	pub fn launch_in_active_session(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
		info!(target = "openwith.session", %command, "executing command in user session");

		let session = find_active_session(&self.api)?;
		info!(target = "openwith.session", session_id = session.session_id, "found active session");

		let context = acquire(&self.api, session)?;
		let command_line = command.command_line();
		let pid = self
			.api
			.create_process(context.token(), context.environment(), session.session_id, &command_line)
			.map_err(|source| LaunchError::ProcessCreation {
				session_id: session.session_id,
				source,
			})?;

		info!(
			target = "openwith.session",
			pid,
			session_id = session.session_id,
			"process created in user session"
		);

		Ok(LaunchReport {
			pid: Some(pid),
			session_id: Some(session.session_id),
			output: None,
		})
	}
}

impl<A> Launcher for CrossSessionLauncher<A>
where
	A: SessionApi + Send + Sync,
{
	fn name(&self) -> &'static str {
		"cross-session"
	}

	fn launch(&self, command: &ResolvedCommand) -> Result<LaunchReport, LaunchError> {
		self.launch_in_active_session(command)
	}
}

/// Service-mode launcher for the current platform.
#[cfg(windows)]
pub fn platform_launcher() -> Arc<dyn Launcher> {
	Arc::new(CrossSessionLauncher::new(WtsSessionApi))
}

/// Service-mode launcher for the current platform.
#[cfg(not(windows))]
pub fn platform_launcher() -> Arc<dyn Launcher> {
	Arc::new(UnsupportedLauncher)
}
