//! Resource modules: thin path-building wrappers over the request pipeline.
//!
//! Every module dereferences to [`ResourceApi`], so the generic `list`/`get`/`create`/
//! `update`/`delete`/`get_related` helpers are available next to the named shortcuts.

// Expands to one named shortcut over a generic [`ResourceApi`] operation.
macro_rules! resource_op {
	($doc:literal, $name:ident, list, $collection:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<$crate::serde_json::Value> {
			self.api.list($collection, params)
		}
	};
	($doc:literal, $name:ident, get, $collection:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			id: &str,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<$crate::serde_json::Map<String, $crate::serde_json::Value>> {
			self.api.get($collection, id, params)
		}
	};
	($doc:literal, $name:ident, create, $collection:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			data: &$crate::serde_json::Value,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<$crate::serde_json::Map<String, $crate::serde_json::Value>> {
			self.api.create($collection, data, params)
		}
	};
	($doc:literal, $name:ident, update, $collection:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			id: &str,
			data: &$crate::serde_json::Value,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<$crate::serde_json::Map<String, $crate::serde_json::Value>> {
			self.api.update($collection, id, data, params)
		}
	};
	($doc:literal, $name:ident, delete, $collection:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			id: &str,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<()> {
			self.api.delete($collection, id, params)
		}
	};
	($doc:literal, $name:ident, related, $collection:literal, $related:literal) => {
		#[doc = $doc]
		pub fn $name(
			&self,
			id: &str,
			params: Option<&$crate::client::Params>,
		) -> $crate::error::Result<$crate::serde_json::Value> {
			self.api.get_related($collection, id, $related, params)
		}
	};
}

// Declares a module struct wrapping a [`ResourceApi`] rooted at `$base`.
macro_rules! resource_module {
	($(#[$meta:meta])* $name:ident, $base:literal) => {
		$(#[$meta])*
		pub struct $name {
			api: $crate::modules::ResourceApi,
		}
		impl $name {
			/// API root every path of this module is built under.
			pub const BASE_PATH: &'static str = $base;

			pub(crate) fn new(
				pipeline: std::sync::Arc<$crate::client::request::RequestPipeline>,
			) -> Self {
				Self { api: $crate::modules::ResourceApi::new(pipeline, Self::BASE_PATH) }
			}
		}
		impl std::ops::Deref for $name {
			type Target = $crate::modules::ResourceApi;

			fn deref(&self) -> &Self::Target {
				&self.api
			}
		}
		impl std::fmt::Debug for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				f.debug_struct(stringify!($name)).field("base_path", &Self::BASE_PATH).finish()
			}
		}
	};
}

pub mod check_ins;
pub mod giving;
pub mod people;
pub mod resources;
pub mod services;

pub use check_ins::CheckIns;
pub use giving::Giving;
pub use people::People;
pub use resources::Resources;
pub use services::Services;

// self
use crate::{
	_prelude::*,
	client::{Params, request::RequestPipeline},
	http::Method,
};

/// Generic CRUD operations against one versioned API root.
pub struct ResourceApi {
	pipeline: Arc<RequestPipeline>,
	base_path: &'static str,
}
impl ResourceApi {
	pub(crate) fn new(pipeline: Arc<RequestPipeline>, base_path: &'static str) -> Self {
		Self { pipeline, base_path }
	}

	/// API root, e.g. `/people/v2`.
	pub fn base_path(&self) -> &str {
		self.base_path
	}

	/// Joins `segments` under the base path.
	///
	/// Each segment is stripped of leading and trailing slashes and empty ones are skipped, so
	/// `build_path(&["/people/", "1"])` under `/people/v2` yields `/people/v2/people/1`.
	pub fn build_path(&self, segments: &[&str]) -> String {
		let mut path = self.base_path.trim_end_matches('/').to_owned();

		for segment in segments.iter().map(|segment| segment.trim_matches('/')) {
			if segment.is_empty() {
				continue;
			}

			path.push('/');
			path.push_str(segment);
		}

		path
	}

	/// Lists a collection.
	pub fn list(&self, collection: &str, params: Option<&Params>) -> Result<Value> {
		self.pipeline.execute(Method::GET, &self.build_path(&[collection]), params, None)
	}

	/// Fetches one record.
	pub fn get(
		&self,
		collection: &str,
		id: &str,
		params: Option<&Params>,
	) -> Result<Map<String, Value>> {
		let path = self.build_path(&[collection, id]);

		into_object(self.pipeline.execute(Method::GET, &path, params, None)?)
	}

	/// Creates a record from `data`.
	pub fn create(
		&self,
		collection: &str,
		data: &Value,
		params: Option<&Params>,
	) -> Result<Map<String, Value>> {
		let path = self.build_path(&[collection]);

		into_object(self.pipeline.execute(Method::POST, &path, params, Some(data))?)
	}

	/// Partially updates a record with `data` (`PATCH`).
	pub fn update(
		&self,
		collection: &str,
		id: &str,
		data: &Value,
		params: Option<&Params>,
	) -> Result<Map<String, Value>> {
		let path = self.build_path(&[collection, id]);

		into_object(self.pipeline.execute(Method::PATCH, &path, params, Some(data))?)
	}

	/// Deletes a record.
	pub fn delete(&self, collection: &str, id: &str, params: Option<&Params>) -> Result<()> {
		let path = self.build_path(&[collection, id]);

		self.pipeline.execute(Method::DELETE, &path, params, None)?;

		Ok(())
	}

	/// Lists the `related` collection nested under one record.
	pub fn get_related(
		&self,
		collection: &str,
		id: &str,
		related: &str,
		params: Option<&Params>,
	) -> Result<Value> {
		let path = self.build_path(&[collection, id, related]);

		self.pipeline.execute(Method::GET, &path, params, None)
	}
}
impl Debug for ResourceApi {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceApi").field("base_path", &self.base_path).finish()
	}
}

fn into_object(value: Value) -> Result<Map<String, Value>> {
	match value {
		Value::Object(map) => Ok(map),
		other => Err(Error::UnexpectedShape { expected: "an object", found: shape_of(&other) }),
	}
}

fn shape_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;
	use crate::{
		auth::Token,
		client::request::AuthSource,
		clock::ManualClock,
		config::ClientConfig,
		error::TransportError,
		http::{HttpRequest, HttpResponse, HttpTransport},
	};

	/// Answers every request with the same body and records `METHOD uri` lines.
	struct Echo {
		body: &'static str,
		seen: Mutex<Vec<String>>,
	}
	impl HttpTransport for Echo {
		fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
			self.seen.lock().push(format!("{} {}", request.method(), request.uri()));

			let mut response = HttpResponse::new(self.body.as_bytes().to_vec());

			*response.status_mut() = StatusCode::OK;

			Ok(response)
		}
	}

	fn api(body: &'static str) -> (ResourceApi, Arc<Echo>) {
		let echo = Arc::new(Echo { body, seen: Mutex::default() });
		let pipeline = RequestPipeline::new(
			ClientConfig::default().with_base_url("http://pco.test"),
			AuthSource::Token(Token::new("static")),
			echo.clone(),
			Arc::new(ManualClock::default()),
		);

		(ResourceApi::new(Arc::new(pipeline), "/people/v2/"), echo)
	}

	#[test]
	fn paths_skip_empty_segments_and_strip_surrounding_slashes() {
		let (api, _) = api("{}");

		assert_eq!(api.build_path(&[]), "/people/v2");
		assert_eq!(api.build_path(&["people", "", "123"]), "/people/v2/people/123");
		assert_eq!(api.build_path(&["//households", "/9/"]), "/people/v2/households/9");
		assert_eq!(api.build_path(&["people/", "/", "1/", "emails"]), "/people/v2/people/1/emails");
	}

	#[test]
	fn related_paths_collapse_stray_slashes() {
		let (api, echo) = api(r#"{"data":[]}"#);

		api.get_related("people/", "1/", "/emails/", None).expect("Related should succeed.");

		assert_eq!(*echo.seen.lock(), vec!["GET http://pco.test/people/v2/people/1/emails"]);
	}

	#[test]
	fn generic_operations_use_the_expected_verbs() {
		let (api, echo) = api(r#"{"data":{}}"#);
		let data = serde_json::json!({ "data": { "attributes": {} } });

		api.list("people", None).expect("List should succeed.");
		api.get("people", "1", None).expect("Get should succeed.");
		api.create("people", &data, None).expect("Create should succeed.");
		api.update("people", "1", &data, None).expect("Update should succeed.");
		api.delete("people", "1", None).expect("Delete should succeed.");
		api.get_related("people", "1", "emails", None).expect("Related should succeed.");

		assert_eq!(
			*echo.seen.lock(),
			vec![
				"GET http://pco.test/people/v2/people",
				"GET http://pco.test/people/v2/people/1",
				"POST http://pco.test/people/v2/people",
				"PATCH http://pco.test/people/v2/people/1",
				"DELETE http://pco.test/people/v2/people/1",
				"GET http://pco.test/people/v2/people/1/emails",
			]
		);
	}

	#[test]
	fn single_record_operations_require_objects() {
		let (api, _) = api("[1,2,3]");
		let err = api.get("people", "1", None).expect_err("Array should be rejected.");

		assert!(matches!(
			err,
			Error::UnexpectedShape { expected: "an object", found: "an array" }
		));
		assert!(api.list("people", None).is_ok());
	}
}
