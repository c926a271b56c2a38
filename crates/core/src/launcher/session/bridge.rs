//! Token and environment acquisition for a target session.

use tracing::debug;

use super::{SessionApi, SessionHandle};
use crate::error::LaunchError;

/// Owns a token handle and closes it on drop.
pub struct TokenGuard<'a, A: SessionApi> {
	api: &'a A,
	token: A::Token,
}

impl<'a, A: SessionApi> TokenGuard<'a, A> {
	fn new(api: &'a A, token: A::Token) -> Self {
		Self { api, token }
	}

	pub fn get(&self) -> A::Token {
		self.token
	}
}

impl<A: SessionApi> Drop for TokenGuard<'_, A> {
	fn drop(&mut self) {
		self.api.close_token(self.token);
	}
}

/// Owns an environment block and destroys it on drop.
pub struct EnvironmentGuard<'a, A: SessionApi> {
	api: &'a A,
	environment: A::Environment,
}

impl<'a, A: SessionApi> EnvironmentGuard<'a, A> {
	fn new(api: &'a A, environment: A::Environment) -> Self {
		Self { api, environment }
	}

	pub fn get(&self) -> A::Environment {
		self.environment
	}
}

impl<A: SessionApi> Drop for EnvironmentGuard<'_, A> {
	fn drop(&mut self) {
		self.api.destroy_environment_block(self.environment);
	}
}

/// Primary token and environment of the target session's user.
///
/// Fields drop in declaration order: the environment block is destroyed
/// before the token it was built from is closed.
pub struct UserContext<'a, A: SessionApi> {
	environment: EnvironmentGuard<'a, A>,
	token: TokenGuard<'a, A>,
}

impl<A: SessionApi> UserContext<'_, A> {
	pub fn token(&self) -> A::Token {
		self.token.get()
	}

	pub fn environment(&self) -> A::Environment {
		self.environment.get()
	}
}

/// Obtains a primary token and environment block for `session`'s user.
///
/// The session token is closed as soon as it has been duplicated. A failure
/// at any step releases whatever earlier steps acquired.
pub fn acquire<A: SessionApi>(api: &A, session: SessionHandle) -> Result<UserContext<'_, A>, LaunchError> {
	let session_id = session.session_id;
	let user_token = api
		.query_user_token(session_id)
		.map_err(|source| LaunchError::TokenAcquisition { session_id, source })?;
	let user_token = TokenGuard::new(api, user_token);
	debug!(target = "openwith.session", session_id, "obtained user token");

	let primary = api
		.duplicate_primary_token(user_token.get())
		.map_err(LaunchError::TokenDuplication)?;
	let primary = TokenGuard::new(api, primary);
	drop(user_token);
	debug!(target = "openwith.session", session_id, "duplicated user token to primary token");

	let environment = api
		.create_environment_block(primary.get())
		.map_err(LaunchError::EnvironmentBlock)?;
	let environment = EnvironmentGuard::new(api, environment);
	debug!(target = "openwith.session", session_id, "created user environment block");

	Ok(UserContext { environment, token: primary })
}
