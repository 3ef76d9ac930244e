//! Snapshot of the token pair held by a token provider.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh token pair as last known by a token provider.
///
/// Values are read by copy; a pair obtained from
/// [`TokenProvider::authorization`](crate::token::TokenProvider::authorization) may already be
/// stale by the time it is inspected because concurrent requests can trigger refreshes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
	/// Short-lived credential attached to outgoing requests.
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential used to obtain new access tokens.
	pub refresh_token: Option<TokenSecret>,
	/// Instant of the last state change, if any.
	pub updated_at: Option<OffsetDateTime>,
}
impl Authorization {
	/// Creates a pair seeded after a login.
	pub fn new(refresh_token: TokenSecret, access_token: Option<TokenSecret>) -> Self {
		Self {
			access_token,
			refresh_token: Some(refresh_token),
			updated_at: Some(OffsetDateTime::now_utc()),
		}
	}

	/// Returns a copy with the access token replaced, keeping the refresh token.
	pub fn with_access_token(&self, access_token: Option<TokenSecret>) -> Self {
		Self {
			access_token,
			refresh_token: self.refresh_token.clone(),
			updated_at: Some(OffsetDateTime::now_utc()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_pair_is_empty() {
		let pair = Authorization::default();

		assert!(pair.access_token.is_none());
		assert!(pair.refresh_token.is_none());
		assert!(pair.updated_at.is_none());
	}

	#[test]
	fn replacing_access_token_keeps_refresh_token() {
		let pair = Authorization::new("refresh".into(), None);
		let next = pair.with_access_token(Some("access".into()));

		assert_eq!(next.refresh_token, Some(TokenSecret::from("refresh")));
		assert_eq!(next.access_token.as_ref().map(TokenSecret::expose), Some("access"));
		assert!(format!("{next:?}").contains("<redacted>"));
	}
}
