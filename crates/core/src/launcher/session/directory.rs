//! Active session discovery.

use super::SessionApi;
use crate::error::LaunchError;

/// One entry of a session enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
	pub session_id: u32,
	/// Attached to the physical console or a remote desktop and logged on.
	pub is_active: bool,
}

/// First active session in enumeration order.
///
/// Only one session is ever targeted. When none is active the launch fails
/// with [`LaunchError::NoActiveSession`] before any token is requested.
pub fn find_active_session<A: SessionApi>(api: &A) -> Result<SessionHandle, LaunchError> {
	let sessions = api.enumerate_sessions().map_err(LaunchError::SessionEnumeration)?;
	sessions
		.into_iter()
		.find(|session| session.is_active)
		.ok_or(LaunchError::NoActiveSession)
}
