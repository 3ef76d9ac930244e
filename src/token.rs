//! Token lifecycle contracts and the built-in single-flight token manager.

pub mod manager;
pub mod metrics;

pub use manager::TokenManager;
pub use metrics::{RefreshCounts, RefreshMetrics};

// self
use crate::{
	_prelude::*,
	auth::{Authorization, TokenSecret},
};

/// Boxed future returned by [`TokenProvider::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<TokenSecret>>> + 'a + Send>>;

/// Owner of the shared access/refresh token pair.
///
/// The pipeline only ever reads the pair by value and asks for refreshes; it never holds the
/// pair across a suspension point. Implementations must coalesce concurrent
/// [`refresh`](Self::refresh) calls so that callers racing on a missing or invalid token share
/// one token-endpoint exchange and its outcome.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Returns the latest known token pair.
	fn authorization(&self) -> Authorization;

	/// Obtains a new access token using the current refresh token.
	///
	/// Resolves to `Ok(None)` when no refresh token is held.
	fn refresh(&self) -> RefreshFuture<'_>;

	/// Seeds the pair, typically after a login.
	fn authorize(&self, refresh_token: TokenSecret, access_token: Option<TokenSecret>);

	/// Forgets both tokens, typically on logout.
	fn clear(&self);
}
