//! Demonstrates the end-user and service guards in front of a remote-introspection validator.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use mealplan_auth::{
	config::AuthConfig,
	guard::{InboundRequest, ServiceGuard, UserGuard},
	http::ReqwestHttpClient,
	reqwest::Client,
	url::Url,
	validator::ReqwestTokenValidator,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let introspection_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/introspect");
			then.status(200).header("content-type", "application/json").body(
				"{\"active\":true,\"sub\":\"user-42\",\"client_id\":\"meal-planner-web\",\"scope\":\"read\"}",
			);
		})
		.await;
	let config = AuthConfig::builder()
		.introspection_enabled(true)
		.client_credentials("meal-plan-service", "super-secret")
		.authority(Url::parse(&server.base_url())?)
		.build()?;
	// The mock server presents a self-signed certificate.
	let http_client =
		ReqwestHttpClient::with_client(Client::builder().danger_accept_invalid_certs(true).build()?);
	let validator = Arc::new(ReqwestTokenValidator::with_http_client(config, http_client));
	let user_guard = UserGuard::new(validator.clone());
	let service_guard = ServiceGuard::new(validator.clone());
	let mut request =
		InboundRequest::new().with_header("Authorization", "Bearer opaque-demo-token");

	user_guard.authorize(&mut request).await?;
	println!("User guard attached: {:?}.", request.identity());

	// Served from the introspection cache.
	service_guard.authorize(&mut request).await?;
	println!("Service guard reused the cache; entries: {}.", validator.cached_entries());

	let mut malformed = InboundRequest::new().with_header("Authorization", "Basic xyz");

	if let Err(rejection) = service_guard.authorize(&mut malformed).await {
		println!("Rejected with {} ({}).", rejection.status_code(), rejection);
	}

	introspection_mock.assert_async().await;

	Ok(())
}
