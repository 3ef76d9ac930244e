//! Policy-hook configuration consumed by the pipeline and the token manager.
//!
//! `hooks` defines the closed set of hook slots and their signatures, `builder` exposes
//! [`InterceptorConfigBuilder`] which validates the required slots in one up-front check,
//! and `presets` ships ready-made hooks for the common bearer/JSON/form-refresh setup.

pub mod builder;
pub mod hooks;
pub mod presets;

pub use builder::*;
pub use hooks::*;

// self
use crate::_prelude::*;

/// Validated hook set shared by every pipeline run.
///
/// Required slots are stored unwrapped, so pipeline code never re-checks their presence.
/// Optional slots stay `Option` and each step decides what "absent" means.
#[derive(Clone)]
pub struct InterceptorConfig {
	pub(crate) should_intercept: RequestPredicate,
	pub(crate) authorize_request: AuthorizeHook,
	pub(crate) create_access_token_request: AccessTokenRequestHook,
	pub(crate) parse_access_token: ParseAccessTokenHook,
	pub(crate) should_fetch: Option<RequestPredicate>,
	pub(crate) should_invalidate_access_token: Option<ResponsePredicate>,
	pub(crate) on_access_token_change: Option<AccessTokenObserver>,
	pub(crate) on_response: Option<ResponseObserver>,
	pub(crate) is_response_unauthorized: UnauthorizedClassifier,
	pub(crate) wait_for_token_renewal: bool,
}
impl InterceptorConfig {
	/// Creates an empty builder; required hooks must be supplied before [`build`](InterceptorConfigBuilder::build).
	pub fn builder() -> InterceptorConfigBuilder {
		InterceptorConfigBuilder::default()
	}

	/// Whether the entry gate waits for a refresh when no access token is known.
	pub fn wait_for_token_renewal(&self) -> bool {
		self.wait_for_token_renewal
	}

	/// Lists the optional hook slots that were configured.
	pub fn configured_optional_hooks(&self) -> Vec<Hook> {
		let mut hooks = Vec::new();

		if self.should_fetch.is_some() {
			hooks.push(Hook::ShouldFetch);
		}
		if self.should_invalidate_access_token.is_some() {
			hooks.push(Hook::ShouldInvalidateAccessToken);
		}
		if self.on_access_token_change.is_some() {
			hooks.push(Hook::OnAccessTokenChange);
		}
		if self.on_response.is_some() {
			hooks.push(Hook::OnResponse);
		}

		hooks
	}

	pub(crate) fn notify_access_token_change(&self, access_token: Option<&crate::auth::TokenSecret>) {
		if let Some(observer) = self.on_access_token_change.as_ref() {
			observer(access_token);
		}
	}
}
impl Debug for InterceptorConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InterceptorConfig")
			.field("optional_hooks", &self.configured_optional_hooks())
			.field("wait_for_token_renewal", &self.wait_for_token_renewal)
			.finish()
	}
}

/// Named hook slots, used in configuration and hook-failure errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
	/// Decides whether auth logic applies to a request.
	ShouldIntercept,
	/// Attaches credentials to a request.
	AuthorizeRequest,
	/// Builds the refresh request sent to the token endpoint.
	CreateAccessTokenRequest,
	/// Extracts the new access token from the token endpoint response.
	ParseAccessToken,
	/// Vetoes the network call.
	ShouldFetch,
	/// Detects soft invalidation signals in a response.
	ShouldInvalidateAccessToken,
	/// Observes access-token changes.
	OnAccessTokenChange,
	/// Observes final responses.
	OnResponse,
}
impl Hook {
	/// Slots that [`InterceptorConfigBuilder::build`] refuses to leave empty.
	pub const REQUIRED: [Hook; 4] = [
		Hook::ShouldIntercept,
		Hook::AuthorizeRequest,
		Hook::CreateAccessTokenRequest,
		Hook::ParseAccessToken,
	];

	/// Returns a stable label suitable for error messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Hook::ShouldIntercept => "should_intercept",
			Hook::AuthorizeRequest => "authorize_request",
			Hook::CreateAccessTokenRequest => "create_access_token_request",
			Hook::ParseAccessToken => "parse_access_token",
			Hook::ShouldFetch => "should_fetch",
			Hook::ShouldInvalidateAccessToken => "should_invalidate_access_token",
			Hook::OnAccessTokenChange => "on_access_token_change",
			Hook::OnResponse => "on_response",
		}
	}

	/// Returns `true` if the slot must be configured.
	pub fn is_required(self) -> bool {
		Self::REQUIRED.contains(&self)
	}
}
impl Display for Hook {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
