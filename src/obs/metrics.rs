// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Counter incremented once per recorded call outcome.
pub const CALL_TOTAL: &str = "pco_client_call_total";
/// Histogram of backoff delays slept before a retry, in seconds.
pub const RETRY_DELAY_SECONDS: &str = "pco_client_retry_delay_seconds";

/// Bumps [`CALL_TOTAL`] for `kind` + `outcome` when the `metrics` feature is on.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(CALL_TOTAL, "call" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records one backoff sleep into [`RETRY_DELAY_SECONDS`].
pub fn record_retry_delay(kind: CallKind, delay: Duration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!(RETRY_DELAY_SECONDS, "call" => kind.as_str()).record(delay.as_seconds_f64());
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, delay);
}
