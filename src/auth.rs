//! OAuth 2.0 credentials: tokens, API scopes, authorization sessions, and the authenticator that
//! owns the token lifecycle.

pub mod authenticator;
pub mod scope;
pub mod secret;
pub mod session;
pub mod token;

pub use authenticator::*;
pub use scope::*;
pub use secret::*;
pub use session::*;
pub use token::*;
