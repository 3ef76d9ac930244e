//! Immutable per-step request record.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// One request's progress through the pipeline.
///
/// Each step consumes the snapshot it is given and returns the next one; nothing is edited in
/// place. Request and response bodies sit behind `Arc`, so the unchanged parts of a snapshot are
/// shared rather than copied when a step replaces a single field.
#[derive(Clone)]
pub struct Snapshot {
	request: Arc<HttpRequest>,
	response: Option<Arc<HttpResponse>>,
	should_intercept: bool,
	should_fetch: bool,
	should_invalidate_access_token: bool,
	access_token: Option<TokenSecret>,
	retried: bool,
	retry_failure: Option<Arc<Error>>,
}
impl Snapshot {
	/// Creates the entry snapshot: no response, fetch allowed, not intercepted, no token.
	pub fn new(request: HttpRequest) -> Self {
		Self {
			request: Arc::new(request),
			response: None,
			should_intercept: false,
			should_fetch: true,
			should_invalidate_access_token: false,
			access_token: None,
			retried: false,
			retry_failure: None,
		}
	}

	/// Outgoing request as it currently stands (authorized, if authorization ran).
	pub fn request(&self) -> &HttpRequest {
		&self.request
	}

	/// Response of the most recent network call, if one happened.
	pub fn response(&self) -> Option<&HttpResponse> {
		self.response.as_deref()
	}

	/// Whether auth logic applies to this request.
	pub fn should_intercept(&self) -> bool {
		self.should_intercept
	}

	/// Whether the next fetch step performs a network call.
	pub fn should_fetch(&self) -> bool {
		self.should_fetch
	}

	/// Whether the response signaled that the access token is no longer valid.
	pub fn should_invalidate_access_token(&self) -> bool {
		self.should_invalidate_access_token
	}

	/// Access token attached to (or available for) this request.
	pub fn access_token(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref()
	}

	/// Whether the unauthorized retry cycle already ran.
	pub fn retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn with_request(self, request: HttpRequest) -> Self {
		Self { request: Arc::new(request), ..self }
	}

	pub(crate) fn with_response(self, response: HttpResponse) -> Self {
		Self { response: Some(Arc::new(response)), ..self }
	}

	// Only the interception step may call this.
	pub(crate) fn with_should_intercept(self, should_intercept: bool) -> Self {
		Self { should_intercept, ..self }
	}

	pub(crate) fn with_should_fetch(self, should_fetch: bool) -> Self {
		Self { should_fetch, ..self }
	}

	pub(crate) fn with_should_invalidate_access_token(self, invalidate: bool) -> Self {
		Self { should_invalidate_access_token: invalidate, ..self }
	}

	pub(crate) fn with_access_token(self, access_token: Option<TokenSecret>) -> Self {
		Self { access_token, ..self }
	}

	pub(crate) fn into_retry(self) -> Self {
		Self { retried: true, response: None, ..self }
	}

	pub(crate) fn with_retry_failure(self, failure: Error) -> Self {
		Self { retry_failure: Some(Arc::new(failure)), response: None, ..self }
	}

	/// Takes the response out of the final snapshot.
	pub(crate) fn into_response(self) -> Option<HttpResponse> {
		let response = self.response?;

		Some(Arc::try_unwrap(response).unwrap_or_else(|shared| crate::http::duplicate_response(&shared)))
	}
}
impl Debug for Snapshot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Snapshot")
			.field("method", self.request.method())
			.field("uri", self.request.uri())
			.field("status", &self.response.as_ref().map(|response| response.status()))
			.field("should_intercept", &self.should_intercept)
			.field("should_fetch", &self.should_fetch)
			.field("should_invalidate_access_token", &self.should_invalidate_access_token)
			.field("access_token", &self.access_token)
			.field("retried", &self.retried)
			.field("retry_failure", &self.retry_failure)
			.finish()
	}
}
