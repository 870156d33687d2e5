//! Optional observability helpers for outbound calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pco_client.call` with the `call` (kind)
//!   and `stage` (call site) fields, plus `debug` events for scheduled retries and a `warn`
//!   event when a failed refresh falls back to the stale token.
//! - Enable `metrics` to increment the `pco_client_call_total` counter for every
//!   attempt/success/failure/retry, labeled by `call` + `outcome`, and to record every backoff
//!   sleep into the `pco_client_retry_delay_seconds` histogram.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outbound call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Resource request sent through the pipeline.
	ApiRequest,
	/// Authorization-code exchange against the token endpoint.
	TokenExchange,
	/// Refresh-token grant against the token endpoint.
	TokenRefresh,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::ApiRequest => "api_request",
			CallKind::TokenExchange => "token_exchange",
			CallKind::TokenRefresh => "token_refresh",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a call site.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Transient failure that will be retried after a backoff.
	Retry,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
