// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::Hook,
	http::{self, HttpTransport},
	obs::{self, Operation, Outcome},
	pipeline::{Pipeline, Snapshot},
};

impl<T> Pipeline<T>
where
	T: ?Sized + HttpTransport,
{
	/// Reads the shared pair; with no access token known, waits for one refresh first so the
	/// first request after a cold start never races an unresolved token.
	pub(super) async fn enter(&self, request: HttpRequest) -> Result<Snapshot> {
		let access_token = match self.tokens.authorization().access_token {
			Some(access_token) => Some(access_token),
			None if self.config.wait_for_token_renewal => self.tokens.refresh().await?,
			None => None,
		};

		Ok(Snapshot::new(request).with_access_token(access_token))
	}

	pub(super) async fn should_intercept(&self, snapshot: Snapshot) -> Result<Snapshot> {
		let decision = (self.config.should_intercept)(snapshot.request())
			.await
			.map_err(|e| Error::hook(Hook::ShouldIntercept, e))?;

		Ok(snapshot.with_should_intercept(decision))
	}

	/// Attaches the provider's current access token, read at this point rather than at the
	/// entry gate so a login or refresh that lands in between is picked up. The gate's token
	/// is used only when the provider holds none.
	pub(super) async fn authorize_request(&self, snapshot: Snapshot) -> Result<Snapshot> {
		if !snapshot.should_intercept() {
			return Ok(snapshot);
		}

		let current = self.tokens.authorization().access_token;
		let access_token = current.or_else(|| snapshot.access_token().cloned());

		self.authorize_with(snapshot, access_token).await
	}

	pub(super) async fn should_fetch(&self, snapshot: Snapshot) -> Result<Snapshot> {
		let Some(hook) = self.config.should_fetch.as_ref() else {
			return Ok(snapshot);
		};
		let decision =
			hook(snapshot.request()).await.map_err(|e| Error::hook(Hook::ShouldFetch, e))?;

		Ok(snapshot.with_should_fetch(decision))
	}

	pub(super) async fn fetch_request(&self, snapshot: Snapshot) -> Result<Snapshot> {
		if !snapshot.should_fetch() {
			return Ok(snapshot);
		}

		let response = self.transport.fetch(http::duplicate_request(snapshot.request())).await?;

		Ok(snapshot.with_response(response))
	}

	pub(super) async fn should_invalidate_access_token(
		&self,
		snapshot: Snapshot,
	) -> Result<Snapshot> {
		if !snapshot.should_intercept() {
			return Ok(snapshot);
		}

		let (Some(hook), Some(response)) =
			(self.config.should_invalidate_access_token.as_ref(), snapshot.response())
		else {
			return Ok(snapshot);
		};
		let decision =
			hook(response).await.map_err(|e| Error::hook(Hook::ShouldInvalidateAccessToken, e))?;

		Ok(snapshot.with_should_invalidate_access_token(decision))
	}

	/// Starts a refresh in the background; the current response is left as is.
	pub(super) fn invalidate_access_token(&self, snapshot: Snapshot) -> Snapshot {
		if snapshot.should_intercept() && snapshot.should_invalidate_access_token() {
			self.spawn_refresh();
		}

		snapshot
	}

	/// Runs the retry cycle at most once per request. Failures inside the cycle become the
	/// snapshot's `retry_failure` and leave it without a response.
	pub(super) async fn handle_unauthorized_request(&self, snapshot: Snapshot) -> Snapshot {
		const OP: Operation = Operation::Retry;

		if !snapshot.should_intercept() || snapshot.retried() {
			return snapshot;
		}

		let unauthorized = snapshot
			.response()
			.is_some_and(|response| (self.config.is_response_unauthorized)(response));

		if !unauthorized {
			return snapshot;
		}

		let fallback = snapshot.clone();

		obs::record_outcome(OP, Outcome::Attempt);

		match obs::in_span(OP, "handle_unauthorized_request", self.retry(snapshot)).await {
			Ok(retried) => {
				obs::record_outcome(OP, Outcome::Success);

				retried
			},
			Err(e) => {
				obs::warn_swallowed(OP, &e);
				obs::record_outcome(OP, Outcome::Swallowed);

				fallback.into_retry().with_retry_failure(e)
			},
		}
	}

	pub(super) fn finalize(&self, snapshot: Snapshot) -> Result<HttpResponse> {
		let response = snapshot.into_response().ok_or(Error::NoResponse)?;

		if let Some(observer) = self.config.on_response.as_ref() {
			observer(&response);
		}

		Ok(response)
	}

	async fn retry(&self, snapshot: Snapshot) -> Result<Snapshot> {
		let access_token: Option<TokenSecret> = self.tokens.refresh().await?;
		let snapshot = snapshot.into_retry();
		let snapshot = match access_token {
			Some(access_token) => self.authorize_with(snapshot, Some(access_token)).await?,
			None => snapshot.with_access_token(None).with_should_fetch(false),
		};

		self.fetch_request(snapshot).await
	}

	async fn authorize_with(
		&self,
		snapshot: Snapshot,
		access_token: Option<TokenSecret>,
	) -> Result<Snapshot> {
		// Intercepted but tokenless requests go out unauthorized.
		let Some(access_token) = access_token else {
			return Ok(snapshot);
		};
		let authorized = (self.config.authorize_request)(snapshot.request(), &access_token)
			.await
			.map_err(|e| Error::hook(Hook::AuthorizeRequest, e))?;

		Ok(snapshot.with_request(authorized).with_access_token(Some(access_token)))
	}

	fn spawn_refresh(&self) {
		const OP: Operation = Operation::Invalidate;

		let Ok(runtime) = tokio::runtime::Handle::try_current() else {
			obs::warn_skipped(OP, "no tokio runtime to run the background refresh");

			return;
		};
		let tokens = Arc::clone(&self.tokens);

		obs::record_outcome(OP, Outcome::Attempt);
		runtime.spawn(async move {
			match tokens.refresh().await {
				Ok(_) => obs::record_outcome(OP, Outcome::Success),
				Err(e) => {
					obs::warn_swallowed(OP, &e);
					obs::record_outcome(OP, Outcome::Swallowed);
				},
			}
		});
	}
}
