//! Token-endpoint facade built on the `oauth2` crate.
//!
//! The facade owns the configured `oauth2` client and turns its responses into [`Token`]
//! values. Every call goes through the caller's [`HttpTransport`], so custom transports cover
//! token traffic as well as API traffic.

pub use oauth2;

// crates.io
use oauth2::{
	AccessToken, AuthType, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, RedirectUrl, RefreshToken, RequestTokenError, Scope as OAuthScope,
	StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
	helpers,
};
// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_TOKEN_TYPE, Token},
	config::{ClientConfig, Credentials},
	error::{AuthError, ConfigError, TransportError},
	http::{HttpTransport, OAuthHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type TokenClient<HasTokenUrl = EndpointNotSet> = Client<
	BasicErrorResponse,
	PcoTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	HasTokenUrl,
>;
type FacadeRequestError = RequestTokenError<TransportError, BasicErrorResponse>;

/// Client-secret-post token endpoint client for the authorization-code and refresh grants.
#[derive(Clone, Debug)]
pub(crate) struct TokenEndpoint {
	oauth_client: TokenClient<EndpointSet>,
}
impl TokenEndpoint {
	pub(crate) fn new(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
		let token_url = TokenUrl::new(config.token_url())
			.map_err(|_| ConfigError::InvalidBaseUrl { url: config.base_url.clone() })?;
		let mut oauth_client = TokenClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(redirect) = credentials.redirect_uri.as_ref().filter(|uri| !uri.is_empty()) {
			let redirect_url = RedirectUrl::new(redirect.clone())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;

			oauth_client = oauth_client.set_redirect_uri(redirect_url);
		}

		Ok(Self { oauth_client })
	}

	/// Exchanges an authorization code for a token issued at `now`.
	pub(crate) fn exchange_code(
		&self,
		transport: &dyn HttpTransport,
		code: &str,
		now: OffsetDateTime,
	) -> Result<Token> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = OAuthHttpClient::new(transport, meta.clone(), now);
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request(&instrumented)
			.map_err(|err| map_request_error(meta.take(), err))?;

		map_token_response(&response, now, None)
	}

	/// Redeems the refresh token held by `previous`.
	///
	/// Refresh token and scope fall back to the previous values when the response omits them.
	pub(crate) fn refresh(
		&self,
		transport: &dyn HttpTransport,
		previous: &Token,
		now: OffsetDateTime,
	) -> Result<Token> {
		let refresh_secret = previous.refresh_token().ok_or(AuthError::MissingRefreshToken)?;
		let meta = ResponseMetadataSlot::default();
		let instrumented = OAuthHttpClient::new(transport, meta.clone(), now);
		let refresh_token = RefreshToken::new(refresh_secret.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_token)
			.request(&instrumented)
			.map_err(|err| map_request_error(meta.take(), err))?;

		map_token_response(&response, now, Some(previous))
	}
}

/// Token endpoint payload. Planning Center may omit `token_type`, which then reads as `bearer`.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct PcoTokenResponse {
	access_token: AccessToken,
	#[serde(
		default = "default_token_type",
		deserialize_with = "helpers::deserialize_untagged_enum_case_insensitive"
	)]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(
		rename = "scope",
		default,
		deserialize_with = "helpers::deserialize_space_delimited_vec",
		serialize_with = "helpers::serialize_space_delimited_vec",
		skip_serializing_if = "Option::is_none"
	)]
	scopes: Option<Vec<OAuthScope>>,
}
impl TokenResponse for PcoTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<OAuthScope>> {
		self.scopes.as_ref()
	}
}

fn default_token_type() -> BasicTokenType {
	BasicTokenType::Bearer
}

fn map_token_response(
	response: &PcoTokenResponse,
	issued_at: OffsetDateTime,
	previous: Option<&Token>,
) -> Result<Token> {
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => DEFAULT_TOKEN_TYPE.to_owned(),
		BasicTokenType::Mac => "MAC".to_owned(),
		BasicTokenType::Extension(other) => other.clone(),
	};
	let mut builder = Token::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type)
		.issued_at(issued_at);

	if let Some(lifetime) = response.expires_in().and_then(|value| Duration::try_from(value).ok())
	{
		builder = builder.expires_in(lifetime);
	}

	// Empty strings count as omitted.
	let refresh = response
		.refresh_token()
		.map(|token| token.secret().to_owned())
		.filter(|token| !token.is_empty())
		.or_else(|| previous.and_then(Token::refresh_token).map(|secret| secret.expose().to_owned()));

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	let scope = response
		.scopes()
		.map(|scopes| scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" "))
		.filter(|scope| !scope.is_empty())
		.or_else(|| previous.and_then(Token::scope).map(ToOwned::to_owned));

	if let Some(scope) = scope {
		builder = builder.scope(scope);
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

fn map_request_error(meta: Option<ResponseMetadata>, err: FacadeRequestError) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let message = match response.error_description() {
				Some(description) => description.clone(),
				None => response.error().as_ref().to_owned(),
			};

			AuthError::TokenEndpoint { message, status }.into()
		},
		RequestTokenError::Request(source) => AuthError::Transport(source).into(),
		RequestTokenError::Parse(source, _body) =>
			AuthError::TokenResponseParse { source, status }.into(),
		RequestTokenError::Other(message) => AuthError::TokenEndpoint { message, status }.into(),
	}
}
