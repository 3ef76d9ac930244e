//! Hook slot signatures.
//!
//! Predicate and transform hooks are stored in their asynchronous form; synchronous closures
//! are lifted into ready futures when they are registered. Hook futures own their data (they
//! are `'static`), so an async hook must copy whatever it needs out of the borrowed request or
//! response before returning its future.

// std
use std::future;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by asynchronous hooks.
pub type HookFuture<T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + Send>>;

/// `(request) -> bool`, used by `should_intercept` and `should_fetch`.
pub type RequestPredicate = Arc<dyn Fn(&HttpRequest) -> HookFuture<bool> + Send + Sync>;
/// `(response) -> bool`, used by `should_invalidate_access_token`.
pub type ResponsePredicate = Arc<dyn Fn(&HttpResponse) -> HookFuture<bool> + Send + Sync>;
/// `(request, access token) -> request`, used by `authorize_request`.
pub type AuthorizeHook =
	Arc<dyn Fn(&HttpRequest, &TokenSecret) -> HookFuture<HttpRequest> + Send + Sync>;
/// `(refresh token) -> request`, used by `create_access_token_request`.
pub type AccessTokenRequestHook =
	Arc<dyn Fn(&TokenSecret) -> Result<HttpRequest, BoxError> + Send + Sync>;
/// `(response) -> access token`, used by `parse_access_token`.
pub type ParseAccessTokenHook = Arc<dyn Fn(&HttpResponse) -> Result<String, BoxError> + Send + Sync>;
/// `(access token)`, used by `on_access_token_change`.
pub type AccessTokenObserver = Arc<dyn Fn(Option<&TokenSecret>) + Send + Sync>;
/// `(response)`, used by `on_response`.
pub type ResponseObserver = Arc<dyn Fn(&HttpResponse) + Send + Sync>;
/// `(response) -> bool`, used by `is_response_unauthorized`.
pub type UnauthorizedClassifier = Arc<dyn Fn(&HttpResponse) -> bool + Send + Sync>;

pub(crate) fn request_predicate<F>(f: F) -> RequestPredicate
where
	F: 'static + Send + Sync + Fn(&HttpRequest) -> bool,
{
	Arc::new(move |request: &HttpRequest| -> HookFuture<bool> {
		Box::pin(future::ready(Ok(f(request))))
	})
}

pub(crate) fn request_predicate_async<F, Fut>(f: F) -> RequestPredicate
where
	F: 'static + Send + Sync + Fn(&HttpRequest) -> Fut,
	Fut: 'static + Send + Future<Output = Result<bool, BoxError>>,
{
	Arc::new(move |request: &HttpRequest| -> HookFuture<bool> { Box::pin(f(request)) })
}

pub(crate) fn response_predicate<F>(f: F) -> ResponsePredicate
where
	F: 'static + Send + Sync + Fn(&HttpResponse) -> bool,
{
	Arc::new(move |response: &HttpResponse| -> HookFuture<bool> {
		Box::pin(future::ready(Ok(f(response))))
	})
}

pub(crate) fn response_predicate_async<F, Fut>(f: F) -> ResponsePredicate
where
	F: 'static + Send + Sync + Fn(&HttpResponse) -> Fut,
	Fut: 'static + Send + Future<Output = Result<bool, BoxError>>,
{
	Arc::new(move |response: &HttpResponse| -> HookFuture<bool> { Box::pin(f(response)) })
}

pub(crate) fn authorize_hook<F>(f: F) -> AuthorizeHook
where
	F: 'static + Send + Sync + Fn(&HttpRequest, &TokenSecret) -> Result<HttpRequest, BoxError>,
{
	Arc::new(move |request: &HttpRequest, token: &TokenSecret| -> HookFuture<HttpRequest> {
		Box::pin(future::ready(f(request, token)))
	})
}

pub(crate) fn authorize_hook_async<F, Fut>(f: F) -> AuthorizeHook
where
	F: 'static + Send + Sync + Fn(&HttpRequest, &TokenSecret) -> Fut,
	Fut: 'static + Send + Future<Output = Result<HttpRequest, BoxError>>,
{
	Arc::new(move |request: &HttpRequest, token: &TokenSecret| -> HookFuture<HttpRequest> {
		Box::pin(f(request, token))
	})
}

pub(crate) fn default_unauthorized_classifier() -> UnauthorizedClassifier {
	Arc::new(crate::http::is_unauthorized)
}
