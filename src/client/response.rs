//! Maps raw API responses onto parsed JSON or typed errors.

// self
use crate::{
	_prelude::*,
	http::{HttpResponse, StatusCode, parse_retry_after},
};

/// Classifies a response by status code.
///
/// Success bodies must be JSON (an empty body reads as `{}`). Error bodies are parsed
/// leniently: one that is not JSON is treated as absent and never changes the error kind.
pub(crate) fn classify(response: HttpResponse, now: OffsetDateTime) -> Result<Value> {
	let status = response.status();
	let retry_after = parse_retry_after(response.headers(), now);
	let raw = response.into_body();

	if status.is_success() {
		if raw.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Object(Map::new()));
		}

		return serde_json::from_slice(&raw)
			.map_err(|source| Error::Decode { status: status.as_u16(), source });
	}

	let body = serde_json::from_slice::<Value>(&raw).ok();

	Err(match status {
		StatusCode::NOT_FOUND => Error::NotFound { message: "Resource not found".into(), body },
		StatusCode::TOO_MANY_REQUESTS =>
			Error::RateLimit { message: "Rate limit exceeded".into(), body, retry_after },
		StatusCode::BAD_REQUEST => Error::Validation {
			message: error_message(body.as_ref()).unwrap_or_else(|| "Validation error".into()),
			body,
		},
		other => Error::Api {
			message: error_message(body.as_ref())
				.unwrap_or_else(|| format!("API error: {}", other.as_u16())),
			status: Some(other.as_u16()),
			body,
			source: None,
		},
	})
}

// `error` first, then the first JSON:API error object's `detail` or `title`.
fn error_message(body: Option<&Value>) -> Option<String> {
	let body = body?;

	match body.get("error") {
		Some(Value::String(message)) => return Some(message.clone()),
		Some(Value::Null) | None => {},
		Some(other) => return Some(other.to_string()),
	}

	let first = body.get("errors")?.as_array()?.first()?;

	first
		.get("detail")
		.and_then(Value::as_str)
		.or_else(|| first.get("title").and_then(Value::as_str))
		.map(ToOwned::to_owned)
}
