//! Fluent construction and up-front validation of [`InterceptorConfig`].

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::{
		AccessTokenObserver, AccessTokenRequestHook, AuthorizeHook, Hook, InterceptorConfig,
		ParseAccessTokenHook, RequestPredicate, ResponseObserver, ResponsePredicate,
		UnauthorizedClassifier, hooks,
	},
	error::ConfigError,
};

/// Builder for [`InterceptorConfig`] values.
///
/// Every slot starts empty. Caller-supplied hooks are merged over the defaults
/// (`is_response_unauthorized` falls back to HTTP 401, `wait_for_token_renewal` to `true`)
/// when [`build`](Self::build) runs.
pub struct InterceptorConfigBuilder {
	should_intercept: Option<RequestPredicate>,
	authorize_request: Option<AuthorizeHook>,
	create_access_token_request: Option<AccessTokenRequestHook>,
	parse_access_token: Option<ParseAccessTokenHook>,
	should_fetch: Option<RequestPredicate>,
	should_invalidate_access_token: Option<ResponsePredicate>,
	on_access_token_change: Option<AccessTokenObserver>,
	on_response: Option<ResponseObserver>,
	is_response_unauthorized: Option<UnauthorizedClassifier>,
	wait_for_token_renewal: bool,
}
impl InterceptorConfigBuilder {
	/// Sets the required interception decision.
	pub fn should_intercept<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> bool,
	{
		self.should_intercept = Some(hooks::request_predicate(f));

		self
	}

	/// Asynchronous variant of [`should_intercept`](Self::should_intercept).
	pub fn should_intercept_async<F, Fut>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> Fut,
		Fut: 'static + Send + Future<Output = Result<bool, BoxError>>,
	{
		self.should_intercept = Some(hooks::request_predicate_async(f));

		self
	}

	/// Sets the required authorization transform.
	pub fn authorize_request<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest, &TokenSecret) -> Result<HttpRequest, BoxError>,
	{
		self.authorize_request = Some(hooks::authorize_hook(f));

		self
	}

	/// Asynchronous variant of [`authorize_request`](Self::authorize_request), e.g. for signing
	/// schemes that consult a remote key service.
	pub fn authorize_request_async<F, Fut>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest, &TokenSecret) -> Fut,
		Fut: 'static + Send + Future<Output = Result<HttpRequest, BoxError>>,
	{
		self.authorize_request = Some(hooks::authorize_hook_async(f));

		self
	}

	/// Sets the required refresh-request constructor.
	pub fn create_access_token_request<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&TokenSecret) -> Result<HttpRequest, BoxError>,
	{
		self.create_access_token_request = Some(Arc::new(f));

		self
	}

	/// Sets the required access-token parser.
	pub fn parse_access_token<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpResponse) -> Result<String, BoxError>,
	{
		self.parse_access_token = Some(Arc::new(f));

		self
	}

	/// Sets the optional fetch veto.
	pub fn should_fetch<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> bool,
	{
		self.should_fetch = Some(hooks::request_predicate(f));

		self
	}

	/// Asynchronous variant of [`should_fetch`](Self::should_fetch).
	pub fn should_fetch_async<F, Fut>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> Fut,
		Fut: 'static + Send + Future<Output = Result<bool, BoxError>>,
	{
		self.should_fetch = Some(hooks::request_predicate_async(f));

		self
	}

	/// Sets the optional soft-invalidation detector.
	pub fn should_invalidate_access_token<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpResponse) -> bool,
	{
		self.should_invalidate_access_token = Some(hooks::response_predicate(f));

		self
	}

	/// Asynchronous variant of
	/// [`should_invalidate_access_token`](Self::should_invalidate_access_token).
	pub fn should_invalidate_access_token_async<F, Fut>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpResponse) -> Fut,
		Fut: 'static + Send + Future<Output = Result<bool, BoxError>>,
	{
		self.should_invalidate_access_token = Some(hooks::response_predicate_async(f));

		self
	}

	/// Sets the optional access-token observer.
	pub fn on_access_token_change<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(Option<&TokenSecret>),
	{
		self.on_access_token_change = Some(Arc::new(f));

		self
	}

	/// Sets the optional final-response observer.
	pub fn on_response<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpResponse),
	{
		self.on_response = Some(Arc::new(f));

		self
	}

	/// Overrides how responses are classified as unauthorized (defaults to HTTP 401).
	pub fn is_response_unauthorized<F>(mut self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&HttpResponse) -> bool,
	{
		self.is_response_unauthorized = Some(Arc::new(f));

		self
	}

	/// Controls whether the entry gate waits for a refresh when no access token is known.
	pub fn wait_for_token_renewal(mut self, wait: bool) -> Self {
		self.wait_for_token_renewal = wait;

		self
	}

	/// Lists the required slots that are still empty, in declaration order.
	pub fn missing_hooks(&self) -> Vec<Hook> {
		let present = [
			self.should_intercept.is_some(),
			self.authorize_request.is_some(),
			self.create_access_token_request.is_some(),
			self.parse_access_token.is_some(),
		];

		Hook::REQUIRED
			.into_iter()
			.zip(present)
			.filter_map(|(hook, present)| (!present).then_some(hook))
			.collect()
	}

	/// Consumes the builder and validates that every required hook is present.
	pub fn build(self) -> Result<InterceptorConfig, ConfigError> {
		let missing = self.missing_hooks();

		match (
			self.should_intercept,
			self.authorize_request,
			self.create_access_token_request,
			self.parse_access_token,
		) {
			(
				Some(should_intercept),
				Some(authorize_request),
				Some(create_access_token_request),
				Some(parse_access_token),
			) => Ok(InterceptorConfig {
				should_intercept,
				authorize_request,
				create_access_token_request,
				parse_access_token,
				should_fetch: self.should_fetch,
				should_invalidate_access_token: self.should_invalidate_access_token,
				on_access_token_change: self.on_access_token_change,
				on_response: self.on_response,
				is_response_unauthorized: self
					.is_response_unauthorized
					.unwrap_or_else(hooks::default_unauthorized_classifier),
				wait_for_token_renewal: self.wait_for_token_renewal,
			}),
			_ => Err(ConfigError::MissingHooks { hooks: missing }),
		}
	}
}
impl Default for InterceptorConfigBuilder {
	fn default() -> Self {
		Self {
			should_intercept: None,
			authorize_request: None,
			create_access_token_request: None,
			parse_access_token: None,
			should_fetch: None,
			should_invalidate_access_token: None,
			on_access_token_change: None,
			on_response: None,
			is_response_unauthorized: None,
			wait_for_token_renewal: true,
		}
	}
}
impl Debug for InterceptorConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InterceptorConfigBuilder")
			.field("missing_hooks", &self.missing_hooks())
			.field("wait_for_token_renewal", &self.wait_for_token_renewal)
			.finish()
	}
}
impl From<InterceptorConfig> for InterceptorConfigBuilder {
	fn from(config: InterceptorConfig) -> Self {
		Self {
			should_intercept: Some(config.should_intercept),
			authorize_request: Some(config.authorize_request),
			create_access_token_request: Some(config.create_access_token_request),
			parse_access_token: Some(config.parse_access_token),
			should_fetch: config.should_fetch,
			should_invalidate_access_token: config.should_invalidate_access_token,
			on_access_token_change: config.on_access_token_change,
			on_response: config.on_response,
			is_response_unauthorized: Some(config.is_response_unauthorized),
			wait_for_token_renewal: config.wait_for_token_renewal,
		}
	}
}
