//! Immutable OAuth token value with expiry tracking.

// self
use crate::{_prelude::*, auth::Secret};

/// Token type assumed when the token endpoint does not report one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Single-entry header map produced by [`Token::to_auth_header`].
pub type AuthHeader = BTreeMap<String, String>;

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenBuilderError {
	/// No access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// OAuth 2.0 access credential.
///
/// The expiry instant is fixed when the token is built (issue instant plus `expires_in`) and is
/// never recomputed. A refresh yields a new value instead of mutating this one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	access_token: Secret,
	token_type: String,
	#[serde(default, with = "time::serde::rfc3339::option")]
	expires_at: Option<OffsetDateTime>,
	#[serde(default)]
	refresh_token: Option<Secret>,
	#[serde(default)]
	scope: Option<String>,
}
impl Token {
	/// Creates a non-expiring bearer token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: Secret::new(access_token),
			token_type: DEFAULT_TOKEN_TYPE.into(),
			expires_at: None,
			refresh_token: None,
			scope: None,
		}
	}

	/// Returns a builder for tokens carrying expiry, refresh, or scope metadata.
	pub fn builder() -> TokenBuilder {
		TokenBuilder::default()
	}

	/// Access token secret.
	pub fn access_token(&self) -> &Secret {
		&self.access_token
	}

	/// Token type used as the `Authorization` scheme.
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Expiry instant, if the token has a known lifetime.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Refresh token secret, if one was issued.
	pub fn refresh_token(&self) -> Option<&Secret> {
		self.refresh_token.as_ref()
	}

	/// Space-delimited scopes granted to the token.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Returns `true` when a refresh token is present.
	pub fn can_refresh(&self) -> bool {
		self.refresh_token.is_some()
	}

	/// Returns `true` if the token has expired at `instant`; tokens without expiry never do.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token has expired relative to the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// `Authorization` header value: `<token_type> <access_token>`.
	pub fn authorization_value(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}

	/// Header map containing exactly the `Authorization` entry.
	pub fn to_auth_header(&self) -> AuthHeader {
		AuthHeader::from([("Authorization".to_owned(), self.authorization_value())])
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &self.access_token)
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.field("refresh_token", &self.refresh_token)
			.field("scope", &self.scope)
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug, Default)]
pub struct TokenBuilder {
	access_token: Option<Secret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	expires_at: Option<OffsetDateTime>,
	refresh_token: Option<Secret>,
	scope: Option<String>,
}
impl TokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Overrides the token type (defaults to `Bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the instant `expires_in` is measured from (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the lifetime relative to the issue instant.
	///
	/// A zero or negative lifetime means the lifetime is unknown and leaves the token without
	/// an expiry.
	pub fn expires_in(mut self, lifetime: Duration) -> Self {
		self.expires_in = Some(lifetime);

		self
	}

	/// Convenience wrapper around [`TokenBuilder::expires_in`] for whole seconds.
	pub fn expires_in_secs(self, secs: i64) -> Self {
		self.expires_in(Duration::seconds(secs))
	}

	/// Sets an absolute expiry instant, taking precedence over `expires_in`.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Provides the granted scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Consumes the builder and produces a [`Token`].
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self
			.access_token
			.filter(|secret| !secret.is_empty())
			.ok_or(TokenBuilderError::MissingAccessToken)?;
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(lifetime)) if lifetime.is_positive() =>
				Some(self.issued_at.unwrap_or_else(OffsetDateTime::now_utc) + lifetime),
			_ => None,
		};

		Ok(Token {
			access_token,
			token_type: self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into()),
			expires_at,
			refresh_token: self.refresh_token,
			scope: self.scope,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn tokens_without_lifetime_never_expire() {
		let token = Token::new("access");

		assert!(!token.is_expired());
		assert!(!token.is_expired_at(macros::datetime!(9999-12-31 23:59 UTC)));

		let unknown = Token::builder()
			.access_token("access")
			.expires_in_secs(0)
			.build()
			.expect("Zero lifetime should build.");

		assert_eq!(unknown.expires_at(), None);
	}

	#[test]
	fn expiry_is_derived_once_from_issue_instant() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = Token::builder()
			.access_token("access")
			.issued_at(issued)
			.expires_in_secs(3600)
			.build()
			.expect("Token with lifetime should build.");

		assert_eq!(token.expires_at(), Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!token.is_expired_at(issued));
		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:59:59 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn auth_header_has_a_single_authorization_entry() {
		let token = Token::builder()
			.access_token("abc123")
			.token_type("Bearer")
			.build()
			.expect("Token should build.");
		let header = token.to_auth_header();

		assert_eq!(header.len(), 1);
		assert_eq!(header.get("Authorization").map(String::as_str), Some("Bearer abc123"));
	}

	#[test]
	fn builder_requires_access_token() {
		assert_eq!(Token::builder().build(), Err(TokenBuilderError::MissingAccessToken));
		assert_eq!(
			Token::builder().access_token("").build(),
			Err(TokenBuilderError::MissingAccessToken)
		);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let token = Token::builder()
			.access_token("very-secret")
			.refresh_token("also-secret")
			.build()
			.expect("Token should build.");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("very-secret"));
		assert!(!rendered.contains("also-secret"));
	}

	#[test]
	fn tokens_round_trip_through_json() {
		let token = Token::builder()
			.access_token("access")
			.refresh_token("refresh")
			.scope("people services")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in_secs(7200)
			.build()
			.expect("Token should build.");
		let json = serde_json::to_string(&token).expect("Token should serialize.");
		let restored: Token = serde_json::from_str(&json).expect("Token should deserialize.");

		assert_eq!(restored, token);
	}
}
