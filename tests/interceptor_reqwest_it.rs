#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use bearer_fetch::{
	_preludet::*,
	error::RefreshError,
	http::Request,
};

fn get(url: &Url) -> HttpRequest {
	Request::get(url.as_str()).body(Vec::new()).expect("Request fixture should build successfully.")
}

fn token_endpoint(server: &MockServer) -> Url {
	mock_url(&server.base_url(), "/token")
}

#[tokio::test]
async fn unauthorized_response_is_refreshed_and_retried_over_http() {
	let server = MockServer::start_async().await;
	let api_origin = mock_url(&server.base_url(), "/");
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-fresh\",\"token_type\":\"bearer\"}");
		})
		.await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/me").header("authorization", "Bearer access-stale");
			then.status(401);
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/me").header("authorization", "Bearer access-fresh");
			then.status(200).body("me");
		})
		.await;
	let interceptor = build_reqwest_test_interceptor(test_config_builder(
		&api_origin,
		&token_endpoint(&server),
	));

	interceptor.authorize("refresh-seed", Some("access-stale".into()));

	let response = interceptor
		.fetch(get(&mock_url(&server.base_url(), "/api/me")))
		.await
		.expect("Retried request should resolve.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.body().as_slice(), b"me");
	assert_eq!(
		interceptor.get_authorization().access_token.as_ref().map(|secret| secret.expose()),
		Some("access-fresh"),
	);

	stale.assert_async().await;
	token.assert_async().await;
	fresh.assert_async().await;
}

#[tokio::test]
async fn foreign_origin_responses_pass_through_untouched() {
	let server = MockServer::start_async().await;
	let api_origin = Url::parse("https://api.example.com")
		.expect("Foreign API origin should parse successfully.");
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"unused\"}");
		})
		.await;
	let asset = server
		.mock_async(|when, then| {
			when.method(GET).path("/asset.png");
			then.status(401);
		})
		.await;
	let interceptor = build_reqwest_test_interceptor(test_config_builder(
		&api_origin,
		&token_endpoint(&server),
	));

	interceptor.authorize("refresh-seed", Some("access-current".into()));

	let response = interceptor
		.fetch(get(&mock_url(&server.base_url(), "/asset.png")))
		.await
		.expect("Pass-through request should resolve.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	asset.assert_async().await;
	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn concurrent_cold_start_requests_share_one_exchange() {
	let server = MockServer::start_async().await;
	let api_origin = mock_url(&server.base_url(), "/");
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(50))
				.body("{\"access_token\":\"access-shared\"}");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/items").header("authorization", "Bearer access-shared");
			then.status(200).body("[]");
		})
		.await;
	let interceptor = build_reqwest_test_interceptor(test_config_builder(
		&api_origin,
		&token_endpoint(&server),
	));
	let url = mock_url(&server.base_url(), "/api/items");

	interceptor.authorize("refresh-seed", None);

	let (first, second) = tokio::join!(interceptor.fetch(get(&url)), interceptor.fetch(get(&url)));

	assert_eq!(first.expect("First request should resolve.").status(), StatusCode::OK);
	assert_eq!(second.expect("Second request should resolve.").status(), StatusCode::OK);

	token.assert_calls_async(1).await;
	api.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_cold_start_refresh_surfaces_status() {
	let server = MockServer::start_async().await;
	let api_origin = mock_url(&server.base_url(), "/");
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let interceptor = build_reqwest_test_interceptor(test_config_builder(
		&api_origin,
		&token_endpoint(&server),
	));

	interceptor.authorize("refresh-revoked", None);

	let err = interceptor
		.fetch(get(&mock_url(&server.base_url(), "/api/me")))
		.await
		.expect_err("Rejected refresh should fail the request.");

	assert!(matches!(err, Error::Refresh(RefreshError::Rejected { status: 400 })));

	token.assert_async().await;
}
