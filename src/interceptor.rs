//! Public facade: configuration, token passthroughs, and the intercepting `fetch`.

// self
use crate::{
	_prelude::*,
	auth::{Authorization, TokenSecret},
	config::{InterceptorConfig, InterceptorConfigBuilder},
	http::HttpTransport,
	pipeline::Pipeline,
	token::{RefreshMetrics, TokenManager, TokenProvider},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Interceptor specialized for the crate's default reqwest transport.
pub type ReqwestInterceptor = Interceptor<ReqwestTransport>;

/// Drop-in replacement for a fetch-style client that keeps a bearer session alive.
///
/// The interceptor owns the transport, the validated hook set, and a shared token provider.
/// Cloning is cheap and every clone shares the same token pair, so one instance can serve any
/// number of concurrent callers.
pub struct Interceptor<T>
where
	T: ?Sized + HttpTransport,
{
	pipeline: Pipeline<T>,
	refresh_metrics: Option<Arc<RefreshMetrics>>,
}
impl<T> Interceptor<T>
where
	T: ?Sized + HttpTransport,
{
	/// Validates `builder` and wires a [`TokenManager`] that refreshes through `transport`.
	pub fn configure(builder: InterceptorConfigBuilder, transport: impl Into<Arc<T>>) -> Result<Self> {
		let config = Arc::new(builder.build()?);
		let transport = transport.into();
		let manager = TokenManager::<T>::new(Arc::clone(&config), Arc::clone(&transport));
		let refresh_metrics = Some(Arc::clone(manager.metrics()));
		let tokens: Arc<dyn TokenProvider> = Arc::new(manager);

		Ok(Self { pipeline: Pipeline::new(config, transport, tokens), refresh_metrics })
	}

	/// Uses a caller-owned token provider instead of the built-in [`TokenManager`].
	///
	/// The refresh hooks in `config` are not consulted by the interceptor in this mode; the
	/// provider decides how refreshes happen.
	pub fn with_token_provider(
		config: InterceptorConfig,
		transport: impl Into<Arc<T>>,
		tokens: Arc<dyn TokenProvider>,
	) -> Self {
		Self {
			pipeline: Pipeline::new(Arc::new(config), transport.into(), tokens),
			refresh_metrics: None,
		}
	}

	/// Seeds the token pair (e.g. after a login). In-flight requests are unaffected.
	pub fn authorize(&self, refresh_token: impl Into<TokenSecret>, access_token: Option<TokenSecret>) {
		self.pipeline.tokens().authorize(refresh_token.into(), access_token);
	}

	/// Returns the latest known token pair.
	pub fn get_authorization(&self) -> Authorization {
		self.pipeline.tokens().authorization()
	}

	/// Forgets the token pair (e.g. on logout). In-flight requests are not cancelled.
	pub fn clear(&self) {
		self.pipeline.tokens().clear();
	}

	/// Sends `request` through the interception pipeline.
	///
	/// Resolves with the final response, whatever its status. Fails with the original reason
	/// when a hook, the entry-gate refresh, or the initial network call fails, and with
	/// [`Error::NoResponse`] when the request ended without any response.
	pub async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
		self.pipeline.run(request).await
	}

	/// Validated hook set.
	pub fn config(&self) -> &InterceptorConfig {
		self.pipeline.config()
	}

	/// Refresh counters of the built-in token manager, when it is in use.
	pub fn refresh_metrics(&self) -> Option<&Arc<RefreshMetrics>> {
		self.refresh_metrics.as_ref()
	}
}
#[cfg(feature = "reqwest")]
impl Interceptor<ReqwestTransport> {
	/// Validates `builder` and provisions a reqwest transport with default settings.
	///
	/// A client that cannot be constructed (e.g. no usable TLS backend) fails with
	/// [`ConfigError::HttpClientBuild`](crate::error::ConfigError::HttpClientBuild). Configure a
	/// custom [`ReqwestClient`] through [`Interceptor::configure`] when redirects, timeouts, or
	/// TLS roots need tuning.
	pub fn new(builder: InterceptorConfigBuilder) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(crate::error::ConfigError::from)?;

		Self::configure(builder, ReqwestTransport::with_client(client))
	}
}
impl<T> Clone for Interceptor<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { pipeline: self.pipeline.clone(), refresh_metrics: self.refresh_metrics.clone() }
	}
}
impl<T> Debug for Interceptor<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interceptor")
			.field("pipeline", &self.pipeline)
			.field("authorization", &self.get_authorization())
			.finish()
	}
}
