//! Refresh counters kept by [`TokenManager`](crate::token::TokenManager), independent of the
//! optional `metrics` feature.

// std
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug)]
pub(crate) enum RefreshEvent {
	Attempt,
	Success,
	Failure,
	Coalesced,
}

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshCounts {
	/// Token-endpoint exchanges started.
	pub attempts: u64,
	/// Exchanges that produced a new access token.
	pub successes: u64,
	/// Exchanges that failed.
	pub failures: u64,
	/// Refresh calls answered by another caller's exchange.
	pub coalesced: u64,
}

/// Lock-free refresh counters, one slot per [`RefreshEvent`].
#[derive(Debug, Default)]
pub struct RefreshMetrics([AtomicU64; 4]);
impl RefreshMetrics {
	/// Token-endpoint exchanges started.
	pub fn attempts(&self) -> u64 {
		self.load(RefreshEvent::Attempt)
	}

	/// Exchanges that produced a new access token.
	pub fn successes(&self) -> u64 {
		self.load(RefreshEvent::Success)
	}

	/// Exchanges that failed.
	pub fn failures(&self) -> u64 {
		self.load(RefreshEvent::Failure)
	}

	/// Refresh calls answered by another caller's exchange.
	pub fn coalesced(&self) -> u64 {
		self.load(RefreshEvent::Coalesced)
	}

	/// Reads every counter at once. Counters are independent, so concurrent refreshes may
	/// land between the individual loads.
	pub fn counts(&self) -> RefreshCounts {
		RefreshCounts {
			attempts: self.attempts(),
			successes: self.successes(),
			failures: self.failures(),
			coalesced: self.coalesced(),
		}
	}

	pub(crate) fn record(&self, event: RefreshEvent) {
		self.0[event as usize].fetch_add(1, Ordering::Relaxed);
	}

	fn load(&self, event: RefreshEvent) -> u64 {
		self.0[event as usize].load(Ordering::Relaxed)
	}
}
