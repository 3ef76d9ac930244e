//! Default [`TokenProvider`] with singleflight refreshes and session-aware writes.
//!
//! Refreshes are serialized behind one async guard. Every finished exchange bumps a completion
//! counter and stores its outcome; a caller that queued on the guard while an exchange finished
//! returns that stored outcome instead of starting another exchange. `authorize` and `clear`
//! start a new session generation, and a refresh that began in an older generation never
//! overwrites the newer pair.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{Authorization, TokenSecret},
	config::{Hook, InterceptorConfig},
	error::RefreshError,
	http::HttpTransport,
	obs::{self, Operation, Outcome},
	token::{RefreshFuture, RefreshMetrics, TokenProvider, metrics::RefreshEvent},
};

type RefreshOutcome = Result<Option<TokenSecret>, RefreshError>;

/// Token pair owner that talks to the token endpoint through the configured hooks.
pub struct TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	config: Arc<InterceptorConfig>,
	transport: Arc<T>,
	state: RwLock<SessionState>,
	flight: AsyncMutex<()>,
	completed: AtomicU64,
	last_outcome: Mutex<Option<RefreshOutcome>>,
	metrics: Arc<RefreshMetrics>,
}
impl<T> TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a manager with an empty token pair.
	pub fn new(config: Arc<InterceptorConfig>, transport: impl Into<Arc<T>>) -> Self {
		Self {
			config,
			transport: transport.into(),
			state: Default::default(),
			flight: AsyncMutex::new(()),
			completed: AtomicU64::new(0),
			last_outcome: Mutex::new(None),
			metrics: Default::default(),
		}
	}

	/// Shared refresh counters.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	async fn refresh_singleflight(&self) -> Result<Option<TokenSecret>> {
		let observed = self.completed.load(Ordering::Acquire);
		let _singleflight = self.flight.lock().await;

		if self.completed.load(Ordering::Acquire) != observed {
			self.metrics.record(RefreshEvent::Coalesced);
			obs::record_outcome(Operation::Refresh, Outcome::Coalesced);

			let shared = self.last_outcome.lock().clone();

			return match shared {
				Some(outcome) => outcome.map_err(Error::from),
				None => Ok(self.authorization().access_token),
			};
		}

		let outcome = self.exchange().await;

		*self.last_outcome.lock() = Some(outcome.clone());
		self.completed.fetch_add(1, Ordering::Release);

		outcome.map_err(Error::from)
	}

	async fn exchange(&self) -> RefreshOutcome {
		let (refresh_token, generation) = {
			let state = self.state.read();

			(state.pair.refresh_token.clone(), state.generation)
		};
		let Some(refresh_token) = refresh_token else {
			return Ok(None);
		};

		self.metrics.record(RefreshEvent::Attempt);

		match self.request_access_token(&refresh_token).await {
			Ok(access_token) => {
				self.metrics.record(RefreshEvent::Success);
				self.store_refreshed(generation, &access_token);

				Ok(Some(access_token))
			},
			Err(e) => {
				self.metrics.record(RefreshEvent::Failure);

				Err(e)
			},
		}
	}

	async fn request_access_token(
		&self,
		refresh_token: &TokenSecret,
	) -> Result<TokenSecret, RefreshError> {
		let request = (self.config.create_access_token_request)(refresh_token)
			.map_err(|e| RefreshError::hook(Hook::CreateAccessTokenRequest, e))?;
		let response = self.transport.fetch(request).await?;
		let status = response.status();

		if !status.is_success() {
			return Err(RefreshError::Rejected { status: status.as_u16() });
		}

		let access_token = (self.config.parse_access_token)(&response)
			.map_err(|e| RefreshError::hook(Hook::ParseAccessToken, e))?;

		Ok(TokenSecret::new(access_token))
	}

	fn store_refreshed(&self, generation: u64, access_token: &TokenSecret) {
		{
			let mut state = self.state.write();

			// Session replaced while the exchange was in flight.
			if state.generation != generation {
				return;
			}

			state.pair = state.pair.with_access_token(Some(access_token.clone()));
		}

		self.config.notify_access_token_change(Some(access_token));
	}

	fn replace_session(&self, pair: Authorization) {
		let changed = {
			let mut state = self.state.write();
			let changed = state.pair.access_token != pair.access_token;

			state.pair = pair;
			state.generation += 1;

			changed.then(|| state.pair.access_token.clone())
		};

		if let Some(access_token) = changed {
			self.config.notify_access_token_change(access_token.as_ref());
		}
	}
}
impl<T> TokenProvider for TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn authorization(&self) -> Authorization {
		self.state.read().pair.clone()
	}

	fn refresh(&self) -> RefreshFuture<'_> {
		obs::record_outcome(Operation::Refresh, Outcome::Attempt);

		Box::pin(async move {
			let result =
				obs::in_span(Operation::Refresh, "refresh", self.refresh_singleflight()).await;

			match &result {
				Ok(_) => obs::record_outcome(Operation::Refresh, Outcome::Success),
				Err(_) => obs::record_outcome(Operation::Refresh, Outcome::Failure),
			}

			result
		})
	}

	fn authorize(&self, refresh_token: TokenSecret, access_token: Option<TokenSecret>) {
		self.replace_session(Authorization::new(refresh_token, access_token));
	}

	fn clear(&self) {
		self.replace_session(Authorization {
			updated_at: Some(OffsetDateTime::now_utc()),
			..Default::default()
		});
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.read();

		f.debug_struct("TokenManager")
			.field("pair", &state.pair)
			.field("generation", &state.generation)
			.field("completed_refreshes", &self.completed.load(Ordering::Relaxed))
			.finish()
	}
}

#[derive(Debug, Default)]
struct SessionState {
	pair: Authorization,
	// Bumped by `authorize` and `clear`.
	generation: u64,
}

#[cfg(test)]
mod tests {
	// std
	use std::{collections::VecDeque, sync::atomic::AtomicUsize, time::Duration as StdDuration};
	// self
	use super::*;
	use crate::http::{Request, TransportFuture};

	#[derive(Default)]
	struct ScriptedTransport {
		replies: Mutex<VecDeque<(StatusCode, &'static str)>>,
		calls: AtomicUsize,
	}
	impl ScriptedTransport {
		fn replying(replies: impl IntoIterator<Item = (StatusCode, &'static str)>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn fetch(&self, _request: HttpRequest) -> TransportFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let reply = self.replies.lock().pop_front();

			Box::pin(async move {
				tokio::time::sleep(StdDuration::from_millis(20)).await;

				let (status, body) = reply.expect("Transport script ran out of replies.");
				let mut response = HttpResponse::new(body.as_bytes().to_vec());

				*response.status_mut() = status;

				Ok(response)
			})
		}
	}

	fn manager(
		transport: Arc<ScriptedTransport>,
		changes: Arc<Mutex<Vec<Option<String>>>>,
	) -> TokenManager<ScriptedTransport> {
		let config = InterceptorConfig::builder()
			.should_intercept(|_| true)
			.authorize_request(crate::config::presets::bearer)
			.create_access_token_request(|_| {
				Ok(Request::post("https://auth.example.com/token").body(Vec::new())?)
			})
			.parse_access_token(|response| Ok(String::from_utf8(response.body().clone())?))
			.on_access_token_change(move |token| {
				changes.lock().push(token.map(|token| token.expose().to_owned()));
			})
			.build()
			.expect("Test config should validate.");

		TokenManager::new(Arc::new(config), transport)
	}

	#[tokio::test]
	async fn refresh_without_refresh_token_skips_the_exchange() {
		let transport = Arc::new(ScriptedTransport::default());
		let manager = manager(transport.clone(), Default::default());
		let token = manager.refresh().await.expect("Refresh without a session should not fail.");

		assert!(token.is_none());
		assert_eq!(transport.calls(), 0);
		assert_eq!(manager.metrics().attempts(), 0);
	}

	#[tokio::test]
	async fn concurrent_refreshes_share_one_exchange() {
		let transport = Arc::new(ScriptedTransport::replying([(StatusCode::OK, "access-1")]));
		let changes = Arc::new(Mutex::new(Vec::new()));
		let manager = manager(transport.clone(), changes.clone());

		manager.authorize("refresh".into(), None);

		let (first, second) = tokio::join!(manager.refresh(), manager.refresh());

		assert_eq!(first.expect("First refresh should succeed."), Some("access-1".into()));
		assert_eq!(second.expect("Second refresh should succeed."), Some("access-1".into()));
		assert_eq!(transport.calls(), 1);
		assert_eq!(manager.metrics().attempts(), 1);
		assert_eq!(manager.metrics().coalesced(), 1);
		assert_eq!(*changes.lock(), [Some("access-1".to_owned())]);
	}

	#[tokio::test]
	async fn coalesced_callers_share_the_failure() {
		let transport =
			Arc::new(ScriptedTransport::replying([(StatusCode::BAD_REQUEST, "invalid_grant")]));
		let manager = manager(transport.clone(), Default::default());

		manager.authorize("refresh".into(), Some("stale".into()));

		let (first, second) = tokio::join!(manager.refresh(), manager.refresh());

		for result in [first, second] {
			assert!(matches!(
				result,
				Err(Error::Refresh(RefreshError::Rejected { status: 400 }))
			));
		}

		assert_eq!(transport.calls(), 1);
		assert_eq!(manager.metrics().failures(), 1);
		assert_eq!(
			manager.authorization().access_token,
			Some("stale".into()),
			"A failed refresh must leave the pair untouched.",
		);
	}

	#[tokio::test]
	async fn clear_during_refresh_keeps_the_cleared_pair() {
		let transport = Arc::new(ScriptedTransport::replying([(StatusCode::OK, "late")]));
		let changes = Arc::new(Mutex::new(Vec::new()));
		let manager = manager(transport, changes.clone());

		manager.authorize("refresh".into(), Some("first".into()));

		let (refreshed, ()) = tokio::join!(manager.refresh(), async {
			tokio::time::sleep(StdDuration::from_millis(5)).await;
			manager.clear();
		});

		assert_eq!(refreshed.expect("Refresh should still resolve."), Some("late".into()));
		assert_eq!(manager.authorization().access_token, None);
		assert_eq!(manager.authorization().refresh_token, None);
		assert_eq!(*changes.lock(), [Some("first".to_owned()), None]);
	}

	#[tokio::test]
	async fn sequential_refreshes_each_hit_the_endpoint() {
		let transport = Arc::new(ScriptedTransport::replying([
			(StatusCode::OK, "access-1"),
			(StatusCode::OK, "access-2"),
		]));
		let manager = manager(transport.clone(), Default::default());

		manager.authorize("refresh".into(), None);

		assert_eq!(manager.refresh().await.expect("First refresh."), Some("access-1".into()));
		assert_eq!(manager.refresh().await.expect("Second refresh."), Some("access-2".into()));
		assert_eq!(transport.calls(), 2);
		assert_eq!(manager.authorization().access_token, Some("access-2".into()));
	}
}
