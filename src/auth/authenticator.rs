//! OAuth 2.0 token lifecycle for Planning Center applications.
//!
//! [`Authenticator`] owns the authorization-code exchange and the refresh-token grant, keeps
//! the current [`Token`], and hands out `Authorization` headers. When the held token has
//! expired and carries a refresh token, header resolution refreshes it transparently.
//! Concurrent callers that observe the same expired token share one refresh: the first
//! caller takes the refresh guard, later callers wait on it and reuse the rotated token.

// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, AuthorizationSession, Scope, Token, session},
	clock::{Clock, SystemClock},
	config::{ClientConfig, Credentials},
	error::{AuthError, ConfigError},
	http::HttpTransport,
	oauth::TokenEndpoint,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Token-lifecycle owner shared by every request issued through a client.
pub struct Authenticator {
	credentials: Credentials,
	config: ClientConfig,
	endpoint: TokenEndpoint,
	transport: RwLock<Option<Arc<dyn HttpTransport>>>,
	clock: Arc<dyn Clock>,
	token: Mutex<Option<Token>>,
	refresh_flight: Mutex<()>,
}
impl Authenticator {
	/// Creates an authenticator against the production API with the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(credentials: Credentials) -> Result<Self> {
		Self::with_config(credentials, ClientConfig::default())
	}

	/// Creates an authenticator for `config` with the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
		let transport = crate::http::ReqwestTransport::new(config.timeout)?;

		Self::with_transport(credentials, config, Arc::new(transport))
	}

	/// Creates an authenticator that sends token requests through `transport`.
	pub fn with_transport(
		credentials: Credentials,
		config: ClientConfig,
		transport: Arc<dyn HttpTransport>,
	) -> Result<Self> {
		config.validate()?;

		let endpoint = TokenEndpoint::new(&config, &credentials)?;

		Ok(Self {
			credentials,
			config,
			endpoint,
			transport: RwLock::new(Some(transport)),
			clock: Arc::new(SystemClock),
			token: Mutex::new(None),
			refresh_flight: Mutex::new(()),
		})
	}

	/// Replaces the clock used for token stamping and expiry checks.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Seeds the authenticator with a previously persisted token.
	pub fn with_token(self, token: Token) -> Self {
		self.set_token(token);

		self
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.credentials.client_id
	}

	/// Redirect URI registered for the authorization-code flow, if any.
	///
	/// An empty URI counts as unset.
	pub fn redirect_uri(&self) -> Option<&str> {
		self.credentials.redirect_uri.as_deref().filter(|uri| !uri.is_empty())
	}

	/// Configuration the authenticator was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Builds the URL the user visits to grant access.
	///
	/// Values are joined without URL encoding so the space-delimited scope list is preserved
	/// verbatim. `scope` defaults to every API scope.
	pub fn build_authorization_url(&self, state: Option<&str>, scope: Option<&str>) -> String {
		let scope = scope.map_or_else(|| Scope::join(&[]), str::to_owned);
		let mut params = vec![
			("client_id", self.credentials.client_id.clone()),
			("response_type", "code".to_owned()),
			("scope", scope),
		];

		if let Some(redirect) = self.redirect_uri() {
			params.push(("redirect_uri", redirect.to_owned()));
		}
		if let Some(state) = state.filter(|state| !state.is_empty()) {
			params.push(("state", state.to_owned()));
		}

		let query = params
			.into_iter()
			.map(|(key, value)| format!("{key}={value}"))
			.collect::<Vec<_>>()
			.join("&");

		format!("{}?{query}", self.config.authorize_url())
	}

	/// Starts an authorization round-trip with a freshly generated CSRF `state`.
	///
	/// An empty `scopes` slice requests every API scope.
	pub fn start_authorization(&self, scopes: &[Scope]) -> AuthorizationSession {
		let state = session::random_state();
		let authorize_url = self.build_authorization_url(Some(&state), Some(&Scope::join(scopes)));

		AuthorizationSession::new(state, authorize_url)
	}

	/// Exchanges an authorization code for a token and makes it current.
	///
	/// Waits for any refresh in flight, so the exchanged token is never overwritten by it.
	pub fn exchange_code_for_token(&self, code: &str) -> Result<Token> {
		const KIND: CallKind = CallKind::TokenExchange;

		let _flight = self.refresh_flight.lock();
		let _span = CallSpan::new(KIND, "exchange_code_for_token").entered();

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = self.transport().and_then(|transport| {
			self.endpoint.exchange_code(transport.as_ref(), code, self.clock.now())
		});

		match &result {
			Ok(token) => {
				*self.token.lock() = Some(token.clone());

				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Redeems the current refresh token and makes the new token current.
	///
	/// Fails without touching the current token when no token or no refresh token is held.
	pub fn refresh_access_token(&self) -> Result<Token> {
		let _flight = self.refresh_flight.lock();
		let current = self.token.lock().clone().ok_or(AuthError::MissingToken)?;

		self.refresh_locked(&current)
	}

	/// Current token, refreshed first when it has expired and can be refreshed.
	///
	/// A failed refresh is logged and the expired token is returned as-is.
	pub fn current_token(&self) -> Option<Token> {
		let token = self.token.lock().clone()?;

		if !self.needs_refresh(&token) {
			return Some(token);
		}

		let _flight = self.refresh_flight.lock();
		// Another caller may have rotated the token while this one waited.
		let token = self.token.lock().clone()?;

		if !self.needs_refresh(&token) {
			return Some(token);
		}

		match self.refresh_locked(&token) {
			Ok(refreshed) => Some(refreshed),
			Err(e) => {
				obs::log_stale_token_fallback(&e);

				Some(token)
			},
		}
	}

	/// `Authorization` header for the current token.
	pub fn authorization_header(&self) -> Result<AuthHeader> {
		self.current_token()
			.map(|token| token.to_auth_header())
			.ok_or_else(|| AuthError::MissingToken.into())
	}

	/// Replaces the current token once any refresh in flight has settled.
	pub fn set_token(&self, token: Token) {
		let _flight = self.refresh_flight.lock();

		*self.token.lock() = Some(token);
	}

	/// Forgets the current token once any refresh in flight has settled.
	pub fn clear_token(&self) {
		let _flight = self.refresh_flight.lock();

		self.token.lock().take();
	}

	/// Releases the transport. Further token requests fail with
	/// [`ConfigError::TransportClosed`]; calling this again is a no-op.
	pub fn close(&self) {
		self.transport.write().take();
	}

	/// Returns `true` once [`Authenticator::close`] has run.
	pub fn is_closed(&self) -> bool {
		self.transport.read().is_none()
	}

	fn needs_refresh(&self, token: &Token) -> bool {
		token.can_refresh() && token.is_expired_at(self.clock.now())
	}

	// Caller must hold `refresh_flight`.
	fn refresh_locked(&self, current: &Token) -> Result<Token> {
		const KIND: CallKind = CallKind::TokenRefresh;

		if !current.can_refresh() {
			return Err(AuthError::MissingRefreshToken.into());
		}

		let _span = CallSpan::new(KIND, "refresh_access_token").entered();

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = self.transport().and_then(|transport| {
			self.endpoint.refresh(transport.as_ref(), current, self.clock.now())
		});

		match &result {
			Ok(token) => {
				*self.token.lock() = Some(token.clone());

				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	fn transport(&self) -> Result<Arc<dyn HttpTransport>> {
		self.transport.read().clone().ok_or_else(|| ConfigError::TransportClosed.into())
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("client_id", &self.credentials.client_id)
			.field("redirect_uri", &self.credentials.redirect_uri)
			.field("base_url", &self.config.base_url)
			.field("token", &*self.token.lock())
			.field("closed", &self.is_closed())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::{
			atomic::{AtomicUsize, Ordering},
			mpsc::{self, Receiver, Sender},
		},
		thread,
	};
	// crates.io
	use oauth2::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
	use time::macros;
	// self
	use super::*;
	use crate::{
		clock::ManualClock,
		error::TransportError,
		http::{HttpRequest, HttpResponse},
	};

	/// Answers every token request with a fresh bearer token, or fails when `fail` is set.
	#[derive(Default)]
	struct TokenServer {
		calls: AtomicUsize,
		fail: bool,
	}
	impl HttpTransport for TokenServer {
		fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
			let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

			if self.fail {
				return Err(TransportError::network(std::io::Error::other("connection reset")));
			}

			// Slow enough that concurrent callers pile up on the refresh guard.
			thread::sleep(std::time::Duration::from_millis(20));

			let body = format!(
				r#"{{"access_token":"fresh-{n}","token_type":"bearer","expires_in":3600,"refresh_token":"r-{n}"}}"#
			);
			let mut response = HttpResponse::new(body.into_bytes());

			*response.status_mut() = StatusCode::OK;

			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			Ok(response)
		}
	}

	/// Holds each token request until the test releases it.
	struct GatedServer {
		entered: Mutex<Sender<()>>,
		release: Mutex<Receiver<()>>,
	}
	impl HttpTransport for GatedServer {
		fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
			self.entered.lock().send(()).expect("Test should be waiting for the request.");
			self.release.lock().recv().expect("Test should release the request.");

			let mut response = HttpResponse::new(
				br#"{"access_token":"refreshed","token_type":"bearer","refresh_token":"r-1"}"#.to_vec(),
			);

			*response.status_mut() = StatusCode::OK;

			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			Ok(response)
		}
	}

	fn authenticator(transport: Arc<dyn HttpTransport>) -> Authenticator {
		Authenticator::with_transport(
			Credentials::new("client-id", "client-secret"),
			ClientConfig::default(),
			transport,
		)
		.expect("Authenticator should build.")
	}

	fn expired_token(clock: &ManualClock) -> Token {
		Token::builder()
			.access_token("stale")
			.refresh_token("r-0")
			.issued_at(clock.now() - Duration::hours(2))
			.expires_in_secs(3600)
			.build()
			.expect("Expired token should build.")
	}

	#[test]
	fn authorization_url_joins_parameters_literally() {
		let auth = Authenticator::with_transport(
			Credentials::new("abc", "secret").with_redirect_uri("http://localhost:8080/cb"),
			ClientConfig::default(),
			Arc::new(TokenServer::default()),
		)
		.expect("Authenticator should build.");

		assert_eq!(
			auth.build_authorization_url(Some("xyz"), None),
			"https://api.planningcenteronline.com/oauth/authorize?client_id=abc&response_type=code&scope=people services check_ins giving resources&redirect_uri=http://localhost:8080/cb&state=xyz"
		);

		let session = auth.start_authorization(&[Scope::People]);

		assert!(session.authorize_url.contains("&scope=people&"));
		assert!(session.authorize_url.ends_with(&format!("&state={}", session.state)));
	}

	#[test]
	fn authorization_url_skips_empty_state_and_redirect() {
		let auth = Authenticator::with_transport(
			Credentials::new("abc", "secret").with_redirect_uri(""),
			ClientConfig::default(),
			Arc::new(TokenServer::default()),
		)
		.expect("Authenticator should build.");

		assert_eq!(auth.redirect_uri(), None);
		assert_eq!(
			auth.build_authorization_url(Some(""), Some("people")),
			"https://api.planningcenteronline.com/oauth/authorize?client_id=abc&response_type=code&scope=people"
		);
	}

	#[test]
	fn token_replacement_waits_for_refresh_in_flight() {
		let (entered_tx, entered_rx) = mpsc::channel();
		let (release_tx, release_rx) = mpsc::channel();
		let transport =
			Arc::new(GatedServer { entered: Mutex::new(entered_tx), release: Mutex::new(release_rx) });
		let auth = Arc::new(authenticator(transport).with_token(
			Token::builder()
				.access_token("old")
				.refresh_token("r-0")
				.build()
				.expect("Seed token should build."),
		));
		let refresher = {
			let auth = auth.clone();

			thread::spawn(move || auth.refresh_access_token())
		};

		entered_rx.recv().expect("Refresh should reach the transport.");

		let setter = {
			let auth = auth.clone();

			thread::spawn(move || auth.set_token(Token::new("manual")))
		};

		thread::sleep(std::time::Duration::from_millis(20));
		release_tx.send(()).expect("Refresh should still be waiting.");
		refresher.join().expect("Refresh thread should not panic.").expect("Refresh should succeed.");
		setter.join().expect("Setter thread should not panic.");

		assert_eq!(
			auth.current_token().map(|token| token.access_token().expose().to_owned()),
			Some("manual".into())
		);
	}

	#[test]
	fn header_requires_a_token() {
		let auth = authenticator(Arc::new(TokenServer::default()));
		let err = auth.authorization_header().expect_err("Missing token should fail.");

		assert!(matches!(err, Error::Auth(AuthError::MissingToken)));
	}

	#[test]
	fn refresh_without_refresh_token_keeps_current_token() {
		let transport = Arc::new(TokenServer::default());
		let auth = authenticator(transport.clone()).with_token(Token::new("only-access"));
		let err = auth.refresh_access_token().expect_err("Refresh should need a refresh token.");

		assert!(matches!(err, Error::Auth(AuthError::MissingRefreshToken)));
		assert_eq!(
			auth.current_token().map(|token| token.access_token().expose().to_owned()),
			Some("only-access".into())
		);
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn expired_token_is_refreshed_on_header_resolution() {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-01-01 12:00 UTC)));
		let transport = Arc::new(TokenServer::default());
		let auth = authenticator(transport.clone())
			.with_clock(clock.clone())
			.with_token(expired_token(&clock));
		let header = auth.authorization_header().expect("Header should resolve.");

		assert_eq!(header.get("Authorization").map(String::as_str), Some("Bearer fresh-1"));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

		let token = auth.current_token().expect("Refreshed token should be current.");

		assert_eq!(token.expires_at(), Some(macros::datetime!(2025-01-01 13:00 UTC)));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn failed_refresh_returns_the_stale_token() {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-01-01 12:00 UTC)));
		let transport = Arc::new(TokenServer { fail: true, ..Default::default() });
		let auth = authenticator(transport.clone())
			.with_clock(clock.clone())
			.with_token(expired_token(&clock));
		let token = auth.current_token().expect("Stale token should be returned.");

		assert_eq!(token.access_token().expose(), "stale");
		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn concurrent_callers_share_one_refresh() {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-01-01 12:00 UTC)));
		let transport = Arc::new(TokenServer::default());
		let auth = Arc::new(
			authenticator(transport.clone())
				.with_clock(clock.clone())
				.with_token(expired_token(&clock)),
		);
		let handles = (0..8)
			.map(|_| {
				let auth = auth.clone();

				thread::spawn(move || auth.authorization_header())
			})
			.collect::<Vec<_>>();

		for handle in handles {
			let header = handle
				.join()
				.expect("Worker thread should not panic.")
				.expect("Header should resolve.");

			assert_eq!(header.get("Authorization").map(String::as_str), Some("Bearer fresh-1"));
		}

		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn closed_authenticator_rejects_token_requests() {
		let auth = authenticator(Arc::new(TokenServer::default())).with_token(Token::new("held"));

		auth.close();
		auth.close();

		assert!(auth.is_closed());

		let err = auth.exchange_code_for_token("code").expect_err("Closed transport should fail.");

		assert!(matches!(err, Error::Config(ConfigError::TransportClosed)));
		assert!(auth.authorization_header().is_ok());
	}
}
