//! Transport primitives for intercepted requests and token refreshes.
//!
//! The module exposes [`HttpTransport`], the interceptor's only dependency on an HTTP stack,
//! together with helpers that copy the `http` request/response types (which are not
//! `Clone`) so the pipeline can keep an untouched copy of every request it sends.

// crates.io
pub use oauth2::http::{HeaderValue, Method, Request, Response, StatusCode, Uri, header};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::fetch`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Fetch-style transport that performs one real network exchange per call.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// pipeline and the token manager, and the returned future must be `Send` so intercepted
/// requests may hop executor threads. The transport never retries on its own; retry policy
/// belongs to the pipeline.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the full response, whatever its status.
	fn fetch(&self, request: HttpRequest) -> TransportFuture<'_>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	fn fetch(&self, request: HttpRequest) -> TransportFuture<'_> {
		(**self).fetch(request)
	}
}

/// Returns `true` for responses carrying standard `401 Unauthorized` semantics.
pub fn is_unauthorized(response: &HttpResponse) -> bool {
	response.status() == StatusCode::UNAUTHORIZED
}

/// Copies method, URI, version, headers, and body into a fresh request.
///
/// Extensions are not carried over.
pub fn duplicate_request(request: &HttpRequest) -> HttpRequest {
	let mut copy = Request::new(request.body().clone());

	*copy.method_mut() = request.method().clone();
	*copy.uri_mut() = request.uri().clone();
	*copy.version_mut() = request.version();
	*copy.headers_mut() = request.headers().clone();

	copy
}

/// Copies status, version, headers, and body into a fresh response.
///
/// Extensions are not carried over.
pub fn duplicate_response(response: &HttpResponse) -> HttpResponse {
	let mut copy = Response::new(response.body().clone());

	*copy.status_mut() = response.status();
	*copy.version_mut() = response.version();
	*copy.headers_mut() = response.headers().clone();

	copy
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn fetch(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut response_new = Response::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.version_mut() = version;
			*response_new.headers_mut() = headers;

			Ok::<_, TransportError>(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{Method, header::AUTHORIZATION};
	// self
	use super::*;

	#[test]
	fn duplicate_request_copies_every_visible_part() {
		let mut request = Request::new(b"payload".to_vec());

		*request.method_mut() = Method::POST;
		*request.uri_mut() = "https://api.example.com/items".parse().expect("URI should parse.");
		request.headers_mut().insert(AUTHORIZATION, "Bearer a".parse().expect("Header should parse."));

		let copy = duplicate_request(&request);

		assert_eq!(copy.method(), Method::POST);
		assert_eq!(copy.uri(), request.uri());
		assert_eq!(copy.headers(), request.headers());
		assert_eq!(copy.body(), b"payload");
	}

	#[test]
	fn unauthorized_matches_only_401() {
		let mut response = Response::new(Vec::new());

		*response.status_mut() = StatusCode::UNAUTHORIZED;

		assert!(is_unauthorized(&response));

		*response.status_mut() = StatusCode::FORBIDDEN;

		assert!(!is_unauthorized(&response));
		assert_eq!(duplicate_response(&response).status(), StatusCode::FORBIDDEN);
	}
}
