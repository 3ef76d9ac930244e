//! Observability for interceptor operations.
//!
//! Both backends are opt-in and compile to nothing when their feature is off:
//!
//! - `tracing`: every [`Operation`] runs inside a `bearer_fetch.op` span carrying `op` and
//!   `stage` fields. Failures the pipeline swallows (retry cycle, background refresh) and
//!   skipped background refreshes are reported as `warn` events.
//! - `metrics`: the `bearer_fetch_op_total` counter is incremented once per [`Outcome`],
//!   labeled by `op` and `outcome`.

// self
use crate::_prelude::*;

/// Operations observed by the interceptor; the `op` label value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// One intercepted `fetch` call, from entry gate to finalization.
	Fetch,
	/// The single retry cycle after an unauthorized response.
	Retry,
	/// The background refresh triggered by a soft invalidation.
	Invalidate,
	/// A token-endpoint refresh.
	Refresh,
}
impl Operation {
	/// Label value used in spans and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Fetch => "fetch",
			Operation::Retry => "retry",
			Operation::Invalidate => "invalidate",
			Operation::Refresh => "refresh",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How an operation ended; the `outcome` label value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// The operation started.
	Attempt,
	/// It completed.
	Success,
	/// It failed and the caller saw the failure.
	Failure,
	/// It failed and the failure was converted into a value.
	Swallowed,
	/// A refresh was answered by another caller's exchange.
	Coalesced,
}
impl Outcome {
	/// Label value used in metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
			Outcome::Swallowed => "swallowed",
			Outcome::Coalesced => "coalesced",
		}
	}
}

/// Runs `fut` inside the operation's span.
#[cfg(feature = "tracing")]
pub(crate) fn in_span<F>(op: Operation, stage: &'static str, fut: F) -> impl Future<Output = F::Output>
where
	F: Future,
{
	use tracing::Instrument;

	fut.instrument(tracing::info_span!("bearer_fetch.op", op = op.as_str(), stage))
}
#[cfg(not(feature = "tracing"))]
pub(crate) fn in_span<F>(_: Operation, _: &'static str, fut: F) -> F
where
	F: Future,
{
	fut
}

pub(crate) fn record_outcome(op: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!("bearer_fetch_op_total", "op" => op.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (op, outcome);
}

pub(crate) fn warn_swallowed(op: Operation, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op = %op, error = %error, "failure converted into a missing response");
	#[cfg(not(feature = "tracing"))]
	let _ = (op, error);
}

pub(crate) fn warn_skipped(op: Operation, reason: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op = %op, reason, "operation skipped");
	#[cfg(not(feature = "tracing"))]
	let _ = (op, reason);
}
