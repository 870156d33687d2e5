//! Planning Center client facade: construction, convenience verbs, and lazily created resource
//! modules.

pub mod request;

mod response;

pub use request::Params;

// self
use crate::{
	_prelude::*,
	auth::{Authenticator, Token},
	client::request::{AuthSource, RequestPipeline},
	clock::{Clock, SystemClock},
	config::ClientConfig,
	error::ConfigError,
	http::{HttpTransport, Method},
	modules::{CheckIns, Giving, People, Resources, Services},
};

/// Entry point for Planning Center API calls.
///
/// Every request, whether issued directly or through a resource module, shares one pipeline:
/// auth header resolution, dispatch, status classification, and retries. Resource modules are
/// created on first access and the same instance is returned afterwards.
pub struct PcoClient {
	pipeline: Arc<RequestPipeline>,
	people: OnceLock<People>,
	services: OnceLock<Services>,
	check_ins: OnceLock<CheckIns>,
	giving: OnceLock<Giving>,
	resources: OnceLock<Resources>,
}
impl PcoClient {
	/// Starts building a client.
	pub fn builder() -> PcoClientBuilder {
		PcoClientBuilder::default()
	}

	/// Creates a client that authenticates through `authenticator`, using its configuration.
	pub fn with_authenticator(authenticator: Arc<Authenticator>) -> Result<Self> {
		Self::builder().authenticator(authenticator).build()
	}

	/// Creates a client that sends a pre-obtained token with every request.
	pub fn with_token(token: Token) -> Result<Self> {
		Self::builder().token(token).build()
	}

	/// People API (`/people/v2`).
	pub fn people(&self) -> &People {
		self.people.get_or_init(|| People::new(self.pipeline.clone()))
	}

	/// Services API (`/services/v2`).
	pub fn services(&self) -> &Services {
		self.services.get_or_init(|| Services::new(self.pipeline.clone()))
	}

	/// Check-Ins API (`/check_ins/v2`).
	pub fn check_ins(&self) -> &CheckIns {
		self.check_ins.get_or_init(|| CheckIns::new(self.pipeline.clone()))
	}

	/// Giving API (`/giving/v2`).
	pub fn giving(&self) -> &Giving {
		self.giving.get_or_init(|| Giving::new(self.pipeline.clone()))
	}

	/// Resources API (`/resources/v2`).
	pub fn resources(&self) -> &Resources {
		self.resources.get_or_init(|| Resources::new(self.pipeline.clone()))
	}

	/// Sends `method path` with optional query parameters and JSON body.
	///
	/// Returns the parsed JSON (object or array); an empty success body yields `{}`.
	/// Rate-limited and network-failed attempts are retried with linear backoff, so a
	/// non-idempotent call may reach the server more than once.
	pub fn execute(
		&self,
		method: Method,
		path: &str,
		params: Option<&Params>,
		body: Option<&Value>,
	) -> Result<Value> {
		self.pipeline.execute(method, path, params, body)
	}

	/// `GET path`.
	pub fn get(&self, path: &str, params: Option<&Params>) -> Result<Value> {
		self.execute(Method::GET, path, params, None)
	}

	/// `POST path` with a JSON body.
	pub fn post(&self, path: &str, data: Option<&Value>, params: Option<&Params>) -> Result<Value> {
		self.execute(Method::POST, path, params, data)
	}

	/// `PUT path` with a JSON body.
	pub fn put(&self, path: &str, data: Option<&Value>, params: Option<&Params>) -> Result<Value> {
		self.execute(Method::PUT, path, params, data)
	}

	/// `PATCH path` with a JSON body.
	pub fn patch(
		&self,
		path: &str,
		data: Option<&Value>,
		params: Option<&Params>,
	) -> Result<Value> {
		self.execute(Method::PATCH, path, params, data)
	}

	/// `DELETE path`.
	pub fn delete(&self, path: &str, params: Option<&Params>) -> Result<Value> {
		self.execute(Method::DELETE, path, params, None)
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		self.pipeline.config()
	}

	/// Authenticator backing the client, if it was built with one.
	pub fn authenticator(&self) -> Option<&Arc<Authenticator>> {
		self.pipeline.authenticator()
	}

	/// Releases the client's transport and closes the authenticator. Idempotent.
	pub fn close(&self) {
		self.pipeline.close();

		if let Some(authenticator) = self.pipeline.authenticator() {
			authenticator.close();
		}
	}

	/// Returns `true` once [`PcoClient::close`] has run.
	pub fn is_closed(&self) -> bool {
		self.pipeline.is_closed()
	}
}
impl Debug for PcoClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PcoClient")
			.field("base_url", &self.config().base_url)
			.field("authenticator", &self.authenticator().is_some())
			.field("closed", &self.is_closed())
			.finish()
	}
}

/// Builder for [`PcoClient`].
///
/// Supply exactly one credential source: an [`Authenticator`] or a static [`Token`]. Without
/// one the client still builds, and each request fails with
/// [`ConfigError::MissingCredentials`].
#[derive(Default)]
pub struct PcoClientBuilder {
	config: Option<ClientConfig>,
	authenticator: Option<Arc<Authenticator>>,
	token: Option<Token>,
	transport: Option<Arc<dyn HttpTransport>>,
	clock: Option<Arc<dyn Clock>>,
}
impl PcoClientBuilder {
	/// Overrides the configuration, which otherwise comes from the authenticator or defaults.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.config = Some(config);

		self
	}

	/// Authenticates requests through a shared [`Authenticator`].
	pub fn authenticator(mut self, authenticator: Arc<Authenticator>) -> Self {
		self.authenticator = Some(authenticator);

		self
	}

	/// Authenticates requests with a pre-obtained token that is never refreshed.
	pub fn token(mut self, token: Token) -> Self {
		self.token = Some(token);

		self
	}

	/// Sends API requests through `transport` instead of the default reqwest client.
	pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Replaces the clock used for backoff sleeps and `Retry-After` dates.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Validates the inputs and builds the client without touching the network.
	pub fn build(self) -> Result<PcoClient> {
		let auth = match (self.authenticator, self.token) {
			(Some(_), Some(_)) => return Err(ConfigError::ConflictingCredentials.into()),
			(Some(authenticator), None) => AuthSource::Authenticator(authenticator),
			(None, Some(token)) => AuthSource::Token(token),
			(None, None) => AuthSource::Missing,
		};
		let config = match (self.config, &auth) {
			(Some(config), _) => config,
			(None, AuthSource::Authenticator(authenticator)) => authenticator.config().clone(),
			(None, _) => ClientConfig::default(),
		};

		config.validate()?;

		let transport = match self.transport {
			Some(transport) => transport,
			None => default_transport(&config)?,
		};
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
		let pipeline = RequestPipeline::new(config, auth, transport, clock);

		Ok(PcoClient {
			pipeline: Arc::new(pipeline),
			people: OnceLock::new(),
			services: OnceLock::new(),
			check_ins: OnceLock::new(),
			giving: OnceLock::new(),
			resources: OnceLock::new(),
		})
	}
}
impl Debug for PcoClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PcoClientBuilder")
			.field("config", &self.config)
			.field("authenticator_set", &self.authenticator.is_some())
			.field("token_set", &self.token.is_some())
			.field("transport_set", &self.transport.is_some())
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_transport(config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
	Ok(Arc::new(crate::http::ReqwestTransport::new(config.timeout)?))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport(_config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
	Err(ConfigError::MissingTransport.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		config::Credentials,
		error::TransportError,
		http::{HttpRequest, HttpResponse},
	};

	struct Unreachable;
	impl HttpTransport for Unreachable {
		fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
			panic!("No request should be sent.");
		}
	}

	fn authenticator() -> Arc<Authenticator> {
		Arc::new(
			Authenticator::with_transport(
				Credentials::new("client-id", "client-secret"),
				ClientConfig::default().with_base_url("http://127.0.0.1:9"),
				Arc::new(Unreachable),
			)
			.expect("Authenticator should build."),
		)
	}

	#[test]
	fn conflicting_credentials_fail_before_any_request() {
		let err = PcoClient::builder()
			.authenticator(authenticator())
			.token(Token::new("static"))
			.transport(Arc::new(Unreachable))
			.build()
			.expect_err("Both credential sources should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::ConflictingCredentials)));
	}

	#[test]
	fn config_defaults_to_the_authenticators() {
		let client = PcoClient::builder()
			.authenticator(authenticator())
			.transport(Arc::new(Unreachable))
			.build()
			.expect("Client should build.");

		assert_eq!(client.config().base_url, "http://127.0.0.1:9");
		assert!(client.authenticator().is_some());
	}

	#[test]
	fn invalid_base_url_is_rejected() {
		let err = PcoClient::builder()
			.token(Token::new("static"))
			.config(ClientConfig::default().with_base_url("ftp://example.com"))
			.transport(Arc::new(Unreachable))
			.build()
			.expect_err("Non-HTTP base URL should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));
	}

	#[test]
	fn modules_are_created_once() {
		let client = PcoClient::builder()
			.token(Token::new("static"))
			.transport(Arc::new(Unreachable))
			.build()
			.expect("Client should build.");

		assert!(std::ptr::eq(client.people(), client.people()));
		assert!(std::ptr::eq(client.giving(), client.giving()));
		assert_eq!(client.services().base_path(), "/services/v2");
		assert_eq!(client.check_ins().base_path(), "/check_ins/v2");
		assert_eq!(client.resources().base_path(), "/resources/v2");
	}

	#[test]
	fn close_releases_client_and_authenticator() {
		let authenticator = authenticator();

		authenticator.set_token(Token::new("held"));

		let client = PcoClient::builder()
			.authenticator(authenticator.clone())
			.transport(Arc::new(Unreachable))
			.build()
			.expect("Client should build.");

		client.close();
		client.close();

		assert!(client.is_closed());
		assert!(authenticator.is_closed());

		let err = client.get("/people/v2/people", None).expect_err("Closed client should fail.");

		assert!(matches!(err, Error::Config(ConfigError::TransportClosed)));
	}
}
