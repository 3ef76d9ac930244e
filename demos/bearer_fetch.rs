//! Demonstrates an interceptor that refreshes an expired bearer token against a mock API and
//! retries the original request once, invisibly to the caller.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use bearer_fetch::{
	config::{InterceptorConfig, presets},
	http::{ReqwestTransport, Request},
	interceptor::ReqwestInterceptor,
	reqwest::Client,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-fresh\",\"token_type\":\"bearer\"}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-expired");
			then.status(401);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-fresh");
			then.status(200).body("{\"name\":\"demo\"}");
		})
		.await;
	let api_origin = Url::parse(&server.base_url())?;
	let builder = InterceptorConfig::builder()
		.should_intercept(presets::same_origin(&api_origin))
		.authorize_request(presets::bearer)
		.create_access_token_request(presets::refresh_token_form(Url::parse(
			&server.url("/oauth/token"),
		)?))
		.parse_access_token(presets::json_access_token("access_token"))
		.on_access_token_change(|token| match token {
			Some(_) => println!("Access token rotated."),
			None => println!("Access token cleared."),
		});
	let transport =
		ReqwestTransport::with_client(Client::builder().timeout(Duration::from_secs(5)).build()?);
	let interceptor = ReqwestInterceptor::configure(builder, transport)?;

	interceptor.authorize("demo-refresh", Some("demo-expired".into()));

	let response = interceptor
		.fetch(Request::get(server.url("/v1/profile")).body(Vec::new())?)
		.await?;

	println!(
		"Profile ({}): {}.",
		response.status(),
		String::from_utf8_lossy(response.body())
	);

	if let Some(metrics) = interceptor.refresh_metrics() {
		println!("Token refreshes: {}.", metrics.successes());
	}

	expired_mock.assert_async().await;
	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}
