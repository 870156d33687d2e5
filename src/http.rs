//! Blocking transport seam shared by the request pipeline and the authenticator.
//!
//! Everything outbound flows through [`HttpTransport::send`], which takes and returns plain
//! [`http`](oauth2::http) values. The default [`ReqwestTransport`] is backed by
//! `reqwest::blocking`; tests and embedders can supply their own implementation. Token-endpoint
//! calls reach the same transport through an adapter that also captures [`ResponseMetadata`] so
//! OAuth failures can be reported with their HTTP status.

// crates.io
use oauth2::{
	SyncHttpClient,
	http::{HeaderMap, header::RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

pub use oauth2::{
	HttpRequest, HttpResponse,
	http::{Method, StatusCode},
};

/// Blocking HTTP transport.
///
/// Implementations must map timeouts to [`TransportError::Timeout`] and connection or I/O
/// failures to [`TransportError::Network`]; the request pipeline retries exactly those two.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the complete response, whatever its status.
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Metadata captured from the most recent token-endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code, if a response arrived.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Shared slot the token-endpoint adapter writes [`ResponseMetadata`] into.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Adapts an [`HttpTransport`] to the `oauth2` crate's blocking client contract.
pub(crate) struct OAuthHttpClient<'a> {
	transport: &'a dyn HttpTransport,
	slot: ResponseMetadataSlot,
	now: OffsetDateTime,
}
impl<'a> OAuthHttpClient<'a> {
	pub(crate) fn new(
		transport: &'a dyn HttpTransport,
		slot: ResponseMetadataSlot,
		now: OffsetDateTime,
	) -> Self {
		Self { transport, slot, now }
	}
}
impl SyncHttpClient for OAuthHttpClient<'_> {
	type Error = TransportError;

	fn call(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
		self.slot.take();

		let response = self.transport.send(request)?;

		self.slot.store(ResponseMetadata {
			status: Some(response.status().as_u16()),
			retry_after: parse_retry_after(response.headers(), self.now),
		});

		Ok(response)
	}
}

/// [`HttpTransport`] backed by a blocking reqwest client.
///
/// Redirects are not followed: both the token endpoint and the API answer directly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(reqwest::blocking::Client);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a client that applies `timeout` to every request.
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = reqwest::blocking::Client::builder()
			.timeout(timeout.unsigned_abs())
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing blocking client.
	pub fn with_client(client: reqwest::blocking::Client) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let (parts, body) = request.into_parts();
		let response = self
			.0
			.request(parts.method, parts.uri.to_string())
			.headers(parts.headers)
			.body(body)
			.send()?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let mut converted = HttpResponse::new(response.bytes()?.to_vec());

		*converted.status_mut() = status;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}

/// Parses a `Retry-After` header given as delta-seconds or an RFC 2822 date.
pub(crate) fn parse_retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderValue;
	use time::macros;
	// self
	use super::*;

	struct StaticTransport(u16);
	impl HttpTransport for StaticTransport {
		fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
			let mut response = HttpResponse::new(b"{}".to_vec());

			*response.status_mut() =
				StatusCode::from_u16(self.0).expect("Fixture status should be valid.");

			response.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static("7"));

			Ok(response)
		}
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 01 Jan 2025 00:00:30 +0000"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::seconds(30)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Tue, 31 Dec 2024 23:00:00 +0000"));

		assert_eq!(parse_retry_after(&headers, now), None);
		assert_eq!(parse_retry_after(&HeaderMap::new(), now), None);
	}

	#[test]
	fn oauth_adapter_records_response_metadata() {
		let transport = StaticTransport(429);
		let slot = ResponseMetadataSlot::default();
		let adapter =
			OAuthHttpClient::new(&transport, slot.clone(), macros::datetime!(2025-01-01 00:00 UTC));
		let response = adapter
			.call(HttpRequest::new(Vec::new()))
			.expect("Static transport should always respond.");
		let meta = slot.take().expect("Metadata should be recorded after a response.");

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(meta.status, Some(429));
		assert_eq!(meta.retry_after, Some(Duration::seconds(7)));
		assert!(slot.take().is_none());
	}
}
