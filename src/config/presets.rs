//! Ready-made hooks for the common "bearer header + form refresh + JSON token" setup.
//!
//! Every preset is an ordinary function or closure matching one of the builder's hook
//! signatures, so presets and hand-written hooks can be mixed freely.

// std
use std::collections::BTreeMap;
// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::TokenSecret, http};

/// Failures raised by preset hooks.
#[derive(Debug, ThisError)]
pub enum PresetError {
	/// Token value cannot be placed in an HTTP header.
	#[error("Access token contains characters that are not valid in an HTTP header.")]
	InvalidHeaderValue(#[from] oauth2::http::header::InvalidHeaderValue),
	/// Refresh request could not be assembled.
	#[error(transparent)]
	Request(#[from] oauth2::http::Error),
	/// Token endpoint body is not the expected JSON object.
	#[error("Token endpoint returned malformed JSON.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// JSON body lacks the configured token field or holds a non-string value.
	#[error("Token endpoint response has no string field `{field}`.")]
	MissingField {
		/// Field the preset looked for.
		field: String,
	},
}

/// Authorization hook that sets `Authorization: Bearer <token>`, replacing any existing value.
pub fn bearer(request: &HttpRequest, token: &TokenSecret) -> Result<HttpRequest, BoxError> {
	let value = token.to_header_value("Bearer").map_err(PresetError::from)?;
	let mut authorized = http::duplicate_request(request);

	authorized.headers_mut().insert(AUTHORIZATION, value);

	Ok(authorized)
}

/// Interception predicate that matches requests sharing `base`'s scheme, host, and port.
///
/// Requests with relative or unparsable URIs are never intercepted.
pub fn same_origin(base: &Url) -> impl 'static + Send + Sync + Fn(&HttpRequest) -> bool {
	let origin = base.origin();

	move |request| match Url::parse(&request.uri().to_string()) {
		Ok(url) => url.origin() == origin,
		Err(_) => false,
	}
}

/// Refresh-request constructor that POSTs `grant_type=refresh_token` as a form to `endpoint`.
pub fn refresh_token_form(
	endpoint: Url,
) -> impl 'static + Send + Sync + Fn(&TokenSecret) -> Result<HttpRequest, BoxError> {
	move |refresh_token| {
		let body = Serializer::new(String::new())
			.append_pair("grant_type", "refresh_token")
			.append_pair("refresh_token", refresh_token.expose())
			.finish();
		let request = Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(PresetError::from)?;

		Ok(request)
	}
}

/// Access-token parser that reads the string `field` from a JSON object body.
pub fn json_access_token(
	field: impl Into<String>,
) -> impl 'static + Send + Sync + Fn(&HttpResponse) -> Result<String, BoxError> {
	let field = field.into();

	move |response| {
		let mut de = serde_json::Deserializer::from_slice(response.body());
		let body: BTreeMap<String, Value> =
			serde_path_to_error::deserialize(&mut de).map_err(PresetError::from)?;

		match body.get(&field) {
			Some(Value::String(token)) => Ok(token.clone()),
			_ => Err(PresetError::MissingField { field: field.clone() }.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderValue;
	// self
	use super::*;

	fn get(uri: &str) -> HttpRequest {
		Request::get(uri).body(Vec::new()).expect("Request fixture should build.")
	}

	fn json(body: &str) -> HttpResponse {
		HttpResponse::new(body.as_bytes().to_vec())
	}

	#[test]
	fn bearer_replaces_existing_authorization() {
		let mut request = get("https://api.example.com/me");

		request.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));

		let authorized =
			bearer(&request, &TokenSecret::from("fresh")).expect("Bearer preset should succeed.");

		assert_eq!(authorized.headers().get_all(AUTHORIZATION).iter().count(), 1);
		assert_eq!(
			authorized.headers().get(AUTHORIZATION).expect("Header should be present."),
			"Bearer fresh",
		);
		assert!(request.headers().get(AUTHORIZATION).is_some_and(|value| value == "Bearer stale"));
	}

	#[test]
	fn bearer_rejects_header_breaking_tokens() {
		let err = bearer(&get("https://api.example.com/"), &TokenSecret::from("bad\ntoken"))
			.expect_err("Newlines must be rejected.");

		assert!(err.to_string().contains("not valid in an HTTP header"));
	}

	#[test]
	fn same_origin_compares_scheme_host_and_port() {
		let base = Url::parse("https://api.example.com").expect("Base URL should parse.");
		let predicate = same_origin(&base);

		assert!(predicate(&get("https://api.example.com/v1/items")));
		assert!(!predicate(&get("http://api.example.com/v1/items")));
		assert!(!predicate(&get("https://api.example.com:8443/v1/items")));
		assert!(!predicate(&get("https://cdn.example.com/logo.png")));
		assert!(!predicate(&get("/relative")));
	}

	#[test]
	fn refresh_form_encodes_grant() {
		let endpoint = Url::parse("https://auth.example.com/token").expect("URL should parse.");
		let request = refresh_token_form(endpoint)(&TokenSecret::from("r t&1"))
			.expect("Refresh form should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://auth.example.com/token");
		assert_eq!(request.body(), b"grant_type=refresh_token&refresh_token=r+t%261");
	}

	#[test]
	fn json_access_token_reads_field_and_reports_problems() {
		let parse = json_access_token("access_token");

		assert_eq!(
			parse(&json(r#"{"access_token":"abc","expires_in":60}"#))
				.expect("Well-formed body should parse."),
			"abc",
		);

		let missing = parse(&json(r#"{"token":"abc"}"#)).expect_err("Missing field should fail.");

		assert_eq!(missing.to_string(), "Token endpoint response has no string field `access_token`.");

		let malformed = parse(&json("not json")).expect_err("Malformed body should fail.");

		assert_eq!(malformed.to_string(), "Token endpoint returned malformed JSON.");
	}
}
