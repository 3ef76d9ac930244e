//! Interceptor-level error types shared across the pipeline, token provider, and transport.

// self
use crate::{_prelude::*, config::Hook};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error returned by caller-supplied hooks and foreign transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error delivered to callers of [`Interceptor::fetch`](crate::interceptor::Interceptor::fetch).
///
/// Every variant except [`Error::NoResponse`] carries the reason that caused the failure.
/// [`Error::NoResponse`] deliberately carries nothing: it means the request never produced a
/// response (fetch vetoed, or the unauthorized retry cycle failed).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A caller-supplied policy hook failed.
	#[error("The `{hook}` hook failed.")]
	Hook {
		/// Hook slot that produced the failure.
		hook: Hook,
		/// Failure returned by the hook.
		#[source]
		source: BoxError,
	},
	/// The token provider could not refresh the access token.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The pipeline finished without a response.
	#[error("Request completed without a response.")]
	NoResponse,
}
impl Error {
	pub(crate) fn hook(hook: Hook, source: BoxError) -> Self {
		Self::Hook { hook, source }
	}
}

/// Configuration and validation failures raised while setting up the interceptor.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// One or more required hooks were not supplied.
	#[error("Missing required hooks: {}.", format_hooks(.hooks))]
	MissingHooks {
		/// Every required slot left empty, in declaration order.
		hooks: Vec<Hook>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token refresh failures.
///
/// The type is cheap to clone so a single refresh outcome can be handed to every caller that
/// was coalesced onto the same exchange.
#[derive(Clone, Debug, ThisError)]
pub enum RefreshError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the refresh token with HTTP {status}.")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Token endpoint could not be reached.
	#[error("Token endpoint could not be reached.")]
	Transport(#[source] Arc<TransportError>),
	/// A refresh-related hook failed.
	#[error("The `{hook}` hook failed during token refresh.")]
	Hook {
		/// Hook slot that produced the failure.
		hook: Hook,
		/// Failure returned by the hook.
		#[source]
		source: Arc<dyn std::error::Error + Send + Sync>,
	},
}
impl RefreshError {
	pub(crate) fn hook(hook: Hook, source: BoxError) -> Self {
		Self::Hook { hook, source: Arc::from(source) }
	}
}
impl From<TransportError> for RefreshError {
	fn from(e: TransportError) -> Self {
		Self::Transport(Arc::new(e))
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn format_hooks(hooks: &[Hook]) -> String {
	hooks.iter().map(|hook| hook.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as _;
	// self
	use super::*;

	#[test]
	fn missing_hooks_lists_every_slot() {
		let err = ConfigError::MissingHooks {
			hooks: vec![Hook::ShouldIntercept, Hook::ParseAccessToken],
		};

		assert_eq!(err.to_string(), "Missing required hooks: should_intercept, parse_access_token.");
	}

	#[test]
	fn refresh_error_clones_share_the_transport_source() {
		let err = RefreshError::from(TransportError::network(std::io::Error::other("reset")));
		let cloned = err.clone();

		assert_eq!(err.to_string(), cloned.to_string());
		assert_eq!(
			cloned.source().expect("Transport refresh errors should expose a source.").to_string(),
			"Network error occurred while sending the request.",
		);
	}

	#[test]
	fn no_response_has_no_source() {
		assert!(Error::NoResponse.source().is_none());
	}
}
