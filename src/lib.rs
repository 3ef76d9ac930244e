//! Transparent bearer-token interception for fetch-style HTTP clients.
//!
//! Requests picked by a hook get the current access token attached. When a response shows the
//! token went bad, one shared refresh runs and the request is retried once, so call sites never
//! deal with token expiry themselves.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod obs;
pub mod pipeline;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{InterceptorConfig, InterceptorConfigBuilder, presets},
		http::ReqwestTransport,
		interceptor::Interceptor,
	};

	/// Interceptor type alias used by reqwest-backed integration tests.
	pub type ReqwestTestInterceptor = Interceptor<ReqwestTransport>;

	/// Builds a config builder wired with the stock presets: requests to `api_origin` are
	/// intercepted and signed with a bearer header, refreshes POST a form to `token_endpoint`,
	/// and the new token is read from the JSON `access_token` field.
	pub fn test_config_builder(api_origin: &Url, token_endpoint: &Url) -> InterceptorConfigBuilder {
		InterceptorConfig::builder()
			.should_intercept(presets::same_origin(api_origin))
			.authorize_request(presets::bearer)
			.create_access_token_request(presets::refresh_token_form(token_endpoint.clone()))
			.parse_access_token(presets::json_access_token("access_token"))
	}

	/// Constructs an [`Interceptor`] backed by the default reqwest transport and token manager.
	pub fn build_reqwest_test_interceptor(builder: InterceptorConfigBuilder) -> ReqwestTestInterceptor {
		Interceptor::configure(builder, ReqwestTransport::default())
			.expect("Test interceptor configuration should be complete.")
	}

	/// Builds a fully qualified [`Url`] for a path served by a mock server.
	pub fn mock_url(base: &str, path: &str) -> Url {
		Url::parse(base)
			.and_then(|base| base.join(path))
			.expect("Mock server URL should be valid.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use oauth2::{HttpRequest, HttpResponse, http::StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{BoxError, Error, Result};
}

pub use oauth2::{HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
