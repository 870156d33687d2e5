//! Blocking Planning Center Online API client: OAuth 2.0 token lifecycle, one request pipeline
//! with typed error classification and rate-limit aware retries, and thin resource modules for
//! People, Services, Check-Ins, Giving, and Resources.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod modules;
pub mod oauth;
pub mod obs;

pub use auth::{Authenticator, Token};
pub use client::{Params, PcoClient, PcoClientBuilder};
pub use error::{Error, ErrorKind, Result};

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::{Arc, OnceLock},
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Error as ReqwestError;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
