//! Walks through the authorization-code flow against Planning Center.
//!
//! 1. Export `PCO_CLIENT_ID`, `PCO_CLIENT_SECRET`, and `PCO_REDIRECT_URI`.
//! 2. Run the demo without arguments to print an authorization URL.
//! 3. Visit the URL, approve access, and copy `code` and `state` from the redirect.
//! 4. Run the demo again as `authorize <code>` to exchange the code and list a few people.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use pco_client::{
	Authenticator, Params, PcoClient,
	auth::Scope,
	config::Credentials,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let authenticator = Arc::new(Authenticator::new(Credentials::from_env()?)?);
	let Some(code) = std::env::args().nth(1) else {
		let session = authenticator.start_authorization(&[Scope::People, Scope::Services]);

		println!("Send your user to {}.", session.authorize_url);
		println!("Compare the returned `state` against {} before exchanging.", session.state);

		return Ok(());
	};
	let token = authenticator.exchange_code_for_token(&code)?;

	println!("Token expires at {:?}; refreshable: {}.", token.expires_at(), token.can_refresh());

	let client = PcoClient::with_authenticator(authenticator)?;
	let people = client.people().list_people(Some(&Params::from([("per_page", 5)])))?;

	println!("{}", serde_json::to_string_pretty(&people)?);

	client.close();

	Ok(())
}
