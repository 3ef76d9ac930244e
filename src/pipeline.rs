//! Per-request interception pipeline.
//!
//! A request enters through the entry gate, then walks seven fixed steps in order,
//! and finally settles into a response or an error. Steps never run concurrently for one
//! request; each one receives the previous [`Snapshot`] and returns the next. Gating
//! (`should_intercept`, `should_fetch`, retry-once) lives inside the steps, so the step order
//! itself is fixed for every request.

pub mod snapshot;

mod steps;

pub use snapshot::Snapshot;

// self
use crate::{
	_prelude::*,
	config::InterceptorConfig,
	http::HttpTransport,
	obs::{self, Operation, Outcome},
	token::TokenProvider,
};

/// Ordered pipeline steps between the entry gate and finalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Step {
	/// Ask the interception hook whether auth logic applies.
	ShouldIntercept,
	/// Attach credentials when intercepted and a token is known.
	AuthorizeRequest,
	/// Ask the optional veto hook whether to hit the network.
	ShouldFetch,
	/// Perform the network call.
	FetchRequest,
	/// Ask the optional hook whether the response invalidates the token.
	ShouldInvalidateAccessToken,
	/// Start a background refresh when the token was invalidated.
	InvalidateAccessToken,
	/// Refresh, reauthorize, and refetch once after an unauthorized response.
	HandleUnauthorizedRequest,
}
impl Step {
	pub(crate) const ALL: [Step; 7] = [
		Step::ShouldIntercept,
		Step::AuthorizeRequest,
		Step::ShouldFetch,
		Step::FetchRequest,
		Step::ShouldInvalidateAccessToken,
		Step::InvalidateAccessToken,
		Step::HandleUnauthorizedRequest,
	];

	/// Span `stage` label.
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Step::ShouldIntercept => "should_intercept",
			Step::AuthorizeRequest => "authorize_request",
			Step::ShouldFetch => "should_fetch",
			Step::FetchRequest => "fetch_request",
			Step::ShouldInvalidateAccessToken => "should_invalidate_access_token",
			Step::InvalidateAccessToken => "invalidate_access_token",
			Step::HandleUnauthorizedRequest => "handle_unauthorized_request",
		}
	}
}

/// Runs requests through the interception steps against one shared token provider.
pub struct Pipeline<T>
where
	T: ?Sized + HttpTransport,
{
	config: Arc<InterceptorConfig>,
	transport: Arc<T>,
	tokens: Arc<dyn TokenProvider>,
}
impl<T> Pipeline<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a pipeline from its three collaborators.
	pub fn new(
		config: Arc<InterceptorConfig>,
		transport: Arc<T>,
		tokens: Arc<dyn TokenProvider>,
	) -> Self {
		Self { config, transport, tokens }
	}

	/// Validated hook set.
	pub fn config(&self) -> &InterceptorConfig {
		&self.config
	}

	/// Shared token provider.
	pub fn tokens(&self) -> &Arc<dyn TokenProvider> {
		&self.tokens
	}

	/// Drives `request` from the entry gate to its final outcome.
	pub async fn run(&self, request: HttpRequest) -> Result<HttpResponse> {
		const OP: Operation = Operation::Fetch;

		obs::record_outcome(OP, Outcome::Attempt);

		let result = obs::in_span(OP, "run", async move {
			let mut snapshot = self.enter(request).await?;

			for step in Step::ALL {
				snapshot = obs::in_span(OP, step.as_str(), self.apply(step, snapshot)).await?;
			}

			self.finalize(snapshot)
		})
		.await;

		match &result {
			Ok(_) => obs::record_outcome(OP, Outcome::Success),
			Err(_) => obs::record_outcome(OP, Outcome::Failure),
		}

		result
	}

	async fn apply(&self, step: Step, snapshot: Snapshot) -> Result<Snapshot> {
		match step {
			Step::ShouldIntercept => self.should_intercept(snapshot).await,
			Step::AuthorizeRequest => self.authorize_request(snapshot).await,
			Step::ShouldFetch => self.should_fetch(snapshot).await,
			Step::FetchRequest => self.fetch_request(snapshot).await,
			Step::ShouldInvalidateAccessToken => self.should_invalidate_access_token(snapshot).await,
			Step::InvalidateAccessToken => Ok(self.invalidate_access_token(snapshot)),
			Step::HandleUnauthorizedRequest => Ok(self.handle_unauthorized_request(snapshot).await),
		}
	}
}
impl<T> Clone for Pipeline<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			transport: Arc::clone(&self.transport),
			tokens: Arc::clone(&self.tokens),
		}
	}
}
impl<T> Debug for Pipeline<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline").field("config", &self.config).finish()
	}
}
