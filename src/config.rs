//! Client configuration: API endpoints, timeouts, retry policy, and OAuth credentials.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.planningcenteronline.com";

const ENV_CLIENT_ID: &str = "PCO_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "PCO_CLIENT_SECRET";
const ENV_REDIRECT_URI: &str = "PCO_REDIRECT_URI";

/// Linear backoff policy applied to rate-limited and network-failed requests.
///
/// Attempt `n` (zero-based) sleeps `base_delay * (n + 1)` before retrying, up to
/// `max_retries` retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of retries after the initial attempt.
	pub max_retries: u32,
	/// Delay unit multiplied by the attempt number.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Backoff to sleep before retrying after `attempt` failed.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		self.base_delay * (attempt.saturating_add(1))
	}

	/// Returns `true` while `attempt` is below the retry ceiling.
	pub fn allows_retry(&self, attempt: u32) -> bool {
		attempt < self.max_retries
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: 3, base_delay: Duration::seconds(1) }
	}
}

/// Settings shared by the request pipeline and the authenticator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API root; token and authorize endpoints hang off `/oauth`.
	pub base_url: String,
	/// Per-request timeout applied by the default transport.
	pub timeout: Duration,
	/// Retry policy for rate limits and network failures.
	pub retry: RetryPolicy,
}
impl ClientConfig {
	/// Replaces the API root; checked by [`ClientConfig::validate`].
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();

		self
	}

	/// Replaces the per-request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Replaces the retry policy.
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Ensures the base URL can anchor request paths.
	pub fn validate(&self) -> Result<()> {
		let invalid = || ConfigError::InvalidBaseUrl { url: self.base_url.clone() };
		let url = Url::parse(&self.base_url).map_err(|_| invalid())?;

		if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
			return Err(invalid().into());
		}

		Ok(())
	}

	/// Base URL without a trailing slash, ready for path concatenation.
	pub fn api_root(&self) -> &str {
		self.base_url.trim_end_matches('/')
	}

	/// OAuth token endpoint.
	pub fn token_url(&self) -> String {
		format!("{}/oauth/token", self.api_root())
	}

	/// OAuth authorize endpoint.
	pub fn authorize_url(&self) -> String {
		format!("{}/oauth/authorize", self.api_root())
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			timeout: Duration::seconds(30),
			retry: RetryPolicy::default(),
		}
	}
}

/// OAuth application credentials registered with Planning Center.
#[derive(Clone, Debug)]
pub struct Credentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Redirect URI registered for the authorization-code flow.
	pub redirect_uri: Option<String>,
}
impl Credentials {
	/// Creates credentials without a redirect URI.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			redirect_uri: None,
		}
	}

	/// Sets the redirect URI sent with authorize and code-exchange requests.
	pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Reads `PCO_CLIENT_ID`, `PCO_CLIENT_SECRET`, and the optional `PCO_REDIRECT_URI`.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.is_empty())
				.ok_or(Error::from(ConfigError::MissingEnv { name }))
		};
		let mut credentials = Self::new(required(ENV_CLIENT_ID)?, required(ENV_CLIENT_SECRET)?);

		credentials.redirect_uri = lookup(ENV_REDIRECT_URI).filter(|value| !value.is_empty());

		Ok(credentials)
	}
}
