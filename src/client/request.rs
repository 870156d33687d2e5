//! Request descriptors and the retrying pipeline every call flows through.

// crates.io
use oauth2::http::{
	HeaderValue, Request,
	header::{ACCEPT, CONTENT_TYPE},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, Authenticator, Token},
	client::response,
	clock::Clock,
	config::ClientConfig,
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpTransport, Method},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Ordered query parameters.
///
/// Inserting a key that is already present replaces its value in place; repeated keys are
/// not representable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);
impl Params {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`Params::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.insert(key, value);

		self
	}

	/// Sets `key` to `value`, keeping the key's original position if it already exists.
	pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
		let key = key.into();
		let value = value.to_string();

		match self.0.iter_mut().find(|(existing, _)| *existing == key) {
			Some(entry) => entry.1 = value,
			None => self.0.push((key, value)),
		}
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
	}

	/// Iterates over the pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Form-encoded query string without the leading `?`.
	pub fn to_query(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(self.iter()).finish()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: ToString,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::new();

		for (key, value) in iter {
			params.insert(key, value);
		}

		params
	}
}
impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
	K: Into<String>,
	V: ToString,
{
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}

/// Where request credentials come from.
pub(crate) enum AuthSource {
	Authenticator(Arc<Authenticator>),
	Token(Token),
	Missing,
}

/// Single chokepoint for outbound API calls: auth resolution, dispatch, classification, and
/// linear-backoff retries.
pub(crate) struct RequestPipeline {
	config: ClientConfig,
	auth: AuthSource,
	transport: RwLock<Option<Arc<dyn HttpTransport>>>,
	clock: Arc<dyn Clock>,
}
impl RequestPipeline {
	pub(crate) fn new(
		config: ClientConfig,
		auth: AuthSource,
		transport: Arc<dyn HttpTransport>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self { config, auth, transport: RwLock::new(Some(transport)), clock }
	}

	pub(crate) fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub(crate) fn authenticator(&self) -> Option<&Arc<Authenticator>> {
		match &self.auth {
			AuthSource::Authenticator(authenticator) => Some(authenticator),
			_ => None,
		}
	}

	/// Sends the request, retrying rate limits and network failures per the retry policy.
	pub(crate) fn execute(
		&self,
		method: Method,
		path: &str,
		params: Option<&Params>,
		body: Option<&Value>,
	) -> Result<Value> {
		const KIND: CallKind = CallKind::ApiRequest;

		let _span = CallSpan::new(KIND, "execute").entered();
		let policy = self.config.retry;
		let mut attempt = 0;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = loop {
			let failure = match self.send_once(&method, path, params, body) {
				Ok(value) => break Ok(value),
				Err(failure) => failure,
			};

			if failure.is_retryable() && policy.allows_retry(attempt) {
				let delay = policy.delay_for(attempt);

				obs::log_retry_scheduled(attempt + 1, delay, &failure);
				obs::record_call_outcome(KIND, CallOutcome::Retry);
				obs::record_retry_delay(KIND, delay);

				self.clock.sleep(delay);

				attempt += 1;

				continue;
			}

			break Err(failure.into_error());
		};

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Releases the transport; idempotent.
	pub(crate) fn close(&self) {
		self.transport.write().take();
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.transport.read().is_none()
	}

	fn send_once(
		&self,
		method: &Method,
		path: &str,
		params: Option<&Params>,
		body: Option<&Value>,
	) -> Result<Value, AttemptFailure> {
		let auth_header = self.resolve_auth_header()?;
		let transport = self
			.transport
			.read()
			.clone()
			.ok_or_else(|| Error::from(ConfigError::TransportClosed))?;
		let request = self.build_request(method, path, params, body, auth_header)?;
		let response = transport.send(request).map_err(AttemptFailure::Transport)?;

		Ok(response::classify(response, self.clock.now())?)
	}

	// Re-resolved on every attempt so a refresh during backoff is picked up.
	fn resolve_auth_header(&self) -> Result<AuthHeader> {
		match &self.auth {
			AuthSource::Authenticator(authenticator) => authenticator.authorization_header(),
			AuthSource::Token(token) => Ok(token.to_auth_header()),
			AuthSource::Missing => Err(ConfigError::MissingCredentials.into()),
		}
	}

	fn build_request(
		&self,
		method: &Method,
		path: &str,
		params: Option<&Params>,
		body: Option<&Value>,
		auth_header: AuthHeader,
	) -> Result<HttpRequest> {
		let separator = if path.starts_with('/') { "" } else { "/" };
		let mut url = format!("{}{separator}{path}", self.config.api_root());

		if let Some(params) = params.filter(|params| !params.is_empty()) {
			url.push('?');
			url.push_str(&params.to_query());
		}

		let mut builder = Request::builder()
			.method(method.clone())
			.uri(url)
			.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
			.header(ACCEPT, HeaderValue::from_static("application/json"));

		for (name, value) in auth_header {
			builder = builder.header(name, value);
		}

		let payload = body.map(|value| value.to_string().into_bytes()).unwrap_or_default();

		builder.body(payload).map_err(|err| ConfigError::from(err).into())
	}
}

/// Failure of a single attempt, before the retry decision.
#[derive(Debug)]
enum AttemptFailure {
	Transport(TransportError),
	Response(Error),
}
impl AttemptFailure {
	fn is_retryable(&self) -> bool {
		match self {
			AttemptFailure::Transport(e) => e.is_retryable(),
			AttemptFailure::Response(e) => e.is_retryable(),
		}
	}

	fn into_error(self) -> Error {
		match self {
			AttemptFailure::Transport(e) => {
				let cause = match &e {
					TransportError::Timeout { source }
					| TransportError::Network { source }
					| TransportError::Build { source } => source.to_string(),
				};

				Error::Api {
					message: format!("Network error: {cause}"),
					status: None,
					body: None,
					source: Some(e),
				}
			},
			AttemptFailure::Response(e) => e,
		}
	}
}
impl Display for AttemptFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			AttemptFailure::Transport(e) => Display::fmt(e, f),
			AttemptFailure::Response(e) => Display::fmt(e, f),
		}
	}
}
impl From<Error> for AttemptFailure {
	fn from(e: Error) -> Self {
		Self::Response(e)
	}
}
