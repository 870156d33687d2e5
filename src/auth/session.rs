//! CSRF-protected authorization sessions.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, error::AuthError};

const STATE_LEN: usize = 32;

/// Authorization-code handshake returned by
/// [`Authenticator::start_authorization`](crate::auth::Authenticator::start_authorization).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationSession {
	/// Opaque CSRF value that must round-trip through the redirect handler.
	pub state: String,
	/// Authorize URL to send the end-user to.
	pub authorize_url: String,
}
impl AuthorizationSession {
	pub(crate) fn new(state: String, authorize_url: String) -> Self {
		Self { state, authorize_url }
	}

	/// Validates the `state` returned on the redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(AuthError::StateMismatch.into()) }
	}
}

pub(crate) fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
