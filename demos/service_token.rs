//! Demonstrates acquiring a cached service token with the default reqwest transport.
//!
//! Several concurrent callers ask for a token at once; the mock token endpoint sees exactly one
//! client-credentials exchange.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use mealplan_auth::{
	config::AuthConfig,
	http::ReqwestHttpClient,
	reqwest::Client,
	service_token::{AuthorizationHeader, ReqwestServiceTokenProvider},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(100))
				.body(
					"{\"access_token\":\"demo-service-token\",\"token_type\":\"Bearer\",\"expires_in\":900}",
				);
		})
		.await;
	let config = AuthConfig::builder()
		.client_credentials("meal-plan-service", "super-secret")
		.authority(Url::parse(&server.base_url())?)
		.build()?;
	// The mock server presents a self-signed certificate.
	let http_client =
		ReqwestHttpClient::with_client(Client::builder().danger_accept_invalid_certs(true).build()?);
	let provider = Arc::new(ReqwestServiceTokenProvider::with_http_client(config, http_client));
	let (a, b, c) = tokio::join!(provider.token(), provider.token(), provider.token());

	let (a, b, c) = (a?, b?, c?);

	println!("Tokens match: {}.", a == b && b == c);

	let header = provider.authorization_header().await?;

	println!("Outbound header: {}: {}.", AuthorizationHeader::NAME, header.value());
	println!("Cache state: {:?}.", provider.token_info());

	token_mock.assert_async().await;

	Ok(())
}
