//! Client-level error types shared by the authenticator, the request pipeline, and resource
//! modules.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or precondition problem; never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential or token problem.
	#[error(transparent)]
	Auth(#[from] AuthError),

	/// API responded with `404 Not Found`.
	#[error("{message}")]
	NotFound {
		/// Human-readable summary.
		message: String,
		/// Parsed response body, when the API returned one.
		body: Option<Value>,
	},
	/// API responded with `429 Too Many Requests` and the retry ceiling was reached.
	#[error("{message}")]
	RateLimit {
		/// Human-readable summary.
		message: String,
		/// Parsed response body, when the API returned one.
		body: Option<Value>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// API responded with `400 Bad Request`.
	#[error("{message}")]
	Validation {
		/// Message taken from the response body, or a generic fallback.
		message: String,
		/// Parsed response body, when the API returned one.
		body: Option<Value>,
	},
	/// Any other non-success response, or a network failure that exhausted its retries.
	#[error("{message}")]
	Api {
		/// Message taken from the response body, or a generic fallback.
		message: String,
		/// HTTP status code; absent for network failures.
		status: Option<u16>,
		/// Parsed response body, when the API returned one.
		body: Option<Value>,
		/// Transport failure behind a network error.
		#[source]
		source: Option<TransportError>,
	},
	/// Successful response whose body is not valid JSON.
	#[error("API returned a {status} response with a malformed JSON body.")]
	Decode {
		/// HTTP status code of the response.
		status: u16,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Response decoded fine but does not have the shape the operation expects.
	#[error("Expected {expected} response but received {found}.")]
	UnexpectedShape {
		/// Expected JSON shape.
		expected: &'static str,
		/// JSON shape actually received.
		found: &'static str,
	},
}
impl Error {
	/// Coarse classification of the error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Config(_) => ErrorKind::Config,
			Error::Auth(_) => ErrorKind::Auth,
			Error::NotFound { .. } => ErrorKind::NotFound,
			Error::RateLimit { .. } => ErrorKind::RateLimit,
			Error::Validation { .. } => ErrorKind::Validation,
			Error::Api { .. } => ErrorKind::Api,
			Error::Decode { .. } => ErrorKind::Decode,
			Error::UnexpectedShape { .. } => ErrorKind::UnexpectedShape,
		}
	}

	/// HTTP status code associated with the failure, when one exists.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Error::NotFound { .. } => Some(404),
			Error::RateLimit { .. } => Some(429),
			Error::Validation { .. } => Some(400),
			Error::Api { status, .. } => *status,
			Error::Decode { status, .. } => Some(*status),
			Error::Auth(err) => err.status_code(),
			Error::Config(_) | Error::UnexpectedShape { .. } => None,
		}
	}

	/// Parsed response body carried by the error, if any.
	pub fn response_body(&self) -> Option<&Value> {
		match self {
			Error::NotFound { body, .. }
			| Error::RateLimit { body, .. }
			| Error::Validation { body, .. }
			| Error::Api { body, .. } => body.as_ref(),
			_ => None,
		}
	}

	/// Returns `true` for failures the request pipeline retries with backoff.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::RateLimit { .. })
	}
}

/// Error classification returned by [`Error::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// See [`Error::Config`].
	Config,
	/// See [`Error::Auth`].
	Auth,
	/// See [`Error::NotFound`].
	NotFound,
	/// See [`Error::RateLimit`].
	RateLimit,
	/// See [`Error::Validation`].
	Validation,
	/// See [`Error::Api`].
	Api,
	/// See [`Error::Decode`].
	Decode,
	/// See [`Error::UnexpectedShape`].
	UnexpectedShape,
}

/// Configuration and precondition failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Both an authenticator and a static token were supplied.
	#[error("Cannot provide both an authenticator and a token.")]
	ConflictingCredentials,
	/// Neither an authenticator nor a static token was supplied.
	#[error("No authentication provided. Use an authenticator or a token.")]
	MissingCredentials,
	/// The transport has been released through `close`.
	#[error("HTTP transport has been closed.")]
	TransportClosed,
	/// No transport was supplied and the default reqwest transport is disabled.
	#[error("No HTTP transport configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
	/// Base URL cannot be used to build request URLs.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Token builder validation failed.
	#[error("Unable to build token.")]
	TokenBuild(#[from] crate::auth::TokenBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Credential and token-endpoint failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No token has been obtained or set.
	#[error("No token available. Please authenticate first.")]
	MissingToken,
	/// Current token carries no refresh token.
	#[error("No refresh token available.")]
	MissingRefreshToken,
	/// Authorization redirect returned a different `state` than the one issued.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Token endpoint rejected the request.
	#[error("Token endpoint returned an error: {message}.")]
	TokenEndpoint {
		/// Provider-supplied or synthesized description.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint could not be reached.
	#[error("Token endpoint could not be reached.")]
	Transport(#[source] TransportError),
}
impl AuthError {
	/// HTTP status code reported by the token endpoint, if any.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			AuthError::TokenEndpoint { status, .. } | AuthError::TokenResponseParse { status, .. } =>
				*status,
			_ => None,
		}
	}
}

/// Transport-level failures raised by an [`HttpTransport`](crate::http::HttpTransport).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Connection, DNS, TLS, or body I/O failure.
	#[error("Network error: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request could not be built or dispatched at all.
	#[error("Request could not be dispatched.")]
	Build {
		/// Transport-specific builder error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a timeout failure.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a network failure.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a request-building failure.
	pub fn build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Build { source: Box::new(src) }
	}

	/// Returns `true` for timeouts and network failures.
	pub fn is_retryable(&self) -> bool {
		matches!(self, TransportError::Timeout { .. } | TransportError::Network { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() {
			Self::build(e)
		} else if e.is_timeout() {
			Self::timeout(e)
		} else {
			Self::network(e)
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
