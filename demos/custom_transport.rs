//! Demonstrates plugging a custom [`HttpTransport`] into the client.
//!
//! The transport answers from memory: it rate-limits the first call, then serves a canned
//! response. A [`ManualClock`] records the backoff instead of sleeping, so the demo finishes
//! instantly and shows exactly how long the pipeline would have waited.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
// self
use pco_client::{
	PcoClient, Token,
	clock::ManualClock,
	config::ClientConfig,
	error::TransportError,
	http::{HttpRequest, HttpResponse, HttpTransport, StatusCode},
};

#[derive(Default)]
struct CannedTransport {
	calls: AtomicUsize,
}
impl HttpTransport for CannedTransport {
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let call = self.calls.fetch_add(1, Ordering::SeqCst);

		println!("Transport received {} {}.", request.method(), request.uri());

		let (status, body) = if call == 0 {
			(StatusCode::TOO_MANY_REQUESTS, String::new())
		} else {
			(StatusCode::OK, r#"{"data":[{"type":"Plan","id":"1"}]}"#.to_owned())
		};
		let mut response = HttpResponse::new(body.into_bytes());

		*response.status_mut() = status;

		Ok(response)
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let clock = Arc::new(ManualClock::default());
	let client = PcoClient::builder()
		.token(Token::new("demo-token"))
		.config(ClientConfig::default())
		.transport(Arc::new(CannedTransport::default()))
		.clock(clock.clone())
		.build()?;
	let plans = client.services().list_plans(None)?;

	println!("Plans: {plans}.");
	println!("Backoff the pipeline would have slept: {:?}.", clock.sleeps());

	Ok(())
}
