mod support;

// std
use std::sync::{Arc, Mutex};
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use mealplan_auth::{
	client::Endpoint,
	config::AuthConfig,
	error::{ConfigError, Error, Feature, UpstreamError},
	http::{AuthHttpClient, FormRequest, HttpFuture, HttpReply},
	service_token::{AuthorizationHeader, ServiceTokenProvider},
};
use support::*;

const TOKEN_BODY: &str =
	"{\"access_token\":\"service-token-1\",\"token_type\":\"Bearer\",\"expires_in\":3600,\"scope\":\"read write\"}";

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("authorization", basic_auth())
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(200))
				.body(TOKEN_BODY);
		})
		.await;
	let provider = Arc::new(mock_provider(service_config(&server)));
	let tasks = (0..8)
		.map(|_| {
			let provider = provider.clone();

			tokio::spawn(async move { provider.token().await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let token = task
			.await
			.expect("Task should not panic.")
			.expect("Every concurrent caller should receive a token.");

		assert_eq!(token.expose(), "service-token-1");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_callers_share_one_failed_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(503).delay(std::time::Duration::from_millis(200));
		})
		.await;
	let provider = Arc::new(mock_provider(service_config(&server)));
	let tasks = (0..8)
		.map(|_| {
			let provider = provider.clone();

			tokio::spawn(async move { provider.token().await })
		})
		.collect::<Vec<_>>();
	let mut messages = Vec::new();

	for task in tasks {
		let err = task
			.await
			.expect("Task should not panic.")
			.expect_err("Every caller should see the failed exchange.");

		assert!(matches!(
			err,
			Error::Upstream(UpstreamError::Status { endpoint: Endpoint::Token, status: 503 })
		));

		messages.push(err.to_string());
	}

	assert!(messages.windows(2).all(|pair| pair[0] == pair[1]));

	mock.assert_calls_async(1).await;

	provider.token().await.expect_err("A later call should start its own exchange.");

	mock.assert_calls_async(2).await;
	assert!(!provider.token_info().cached);
}

#[tokio::test]
async fn cached_token_is_reused_until_cleared() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let provider = mock_provider(service_config(&server));
	let before = OffsetDateTime::now_utc();
	let header = provider.authorization_header().await.expect("First exchange should succeed.");

	assert_eq!(AuthorizationHeader::NAME, "Authorization");
	assert_eq!(header.value(), "Bearer service-token-1");

	provider.token().await.expect("Cached token should be returned.");
	mock.assert_calls_async(1).await;

	let info = provider.token_info();
	let expires_at = info.expires_at.expect("Expiry should be reported.");

	assert!(info.cached && info.fresh);
	assert!(expires_at >= before + Duration::seconds(3540));
	assert!(expires_at <= OffsetDateTime::now_utc() + Duration::seconds(3540));

	provider.clear_cache();

	assert!(!provider.token_info().cached);

	provider.token().await.expect("Exchange after clear should succeed.");
	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn buffer_longer_than_lifetime_refetches_every_time() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"short\",\"token_type\":\"Bearer\",\"expires_in\":30}");
		})
		.await;
	let mut config = service_config(&server);

	config.token_expiry_buffer = Duration::seconds(60);

	let provider = mock_provider(config);

	provider.token().await.expect("First exchange should succeed.");
	provider.token().await.expect("Second exchange should succeed.");

	mock.assert_calls_async(2).await;
	assert!(!provider.token_info().fresh);
}

#[tokio::test]
async fn rejected_credentials_are_reported_and_not_cached() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(401).body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let provider = mock_provider(service_config(&server));

	for _ in 0..2 {
		let err = provider.token().await.expect_err("Rejected credentials must fail.");

		assert!(matches!(
			err,
			Error::Upstream(UpstreamError::InvalidClient { endpoint: Endpoint::Token })
		));
	}

	mock.assert_calls_async(2).await;
	assert!(!provider.token_info().cached);
}

#[tokio::test]
async fn other_statuses_and_bad_lifetimes_are_specific() {
	let server = MockServer::start_async().await;
	let unavailable = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(503);
		})
		.await;
	let provider = mock_provider(service_config(&server));
	let err = provider.token().await.expect_err("Unavailable provider must fail.");

	assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 503, .. })));

	unavailable.delete_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"t\",\"token_type\":\"Bearer\"}");
		})
		.await;

	let err = provider.token().await.expect_err("Missing expires_in must fail.");

	assert!(matches!(err, Error::Upstream(UpstreamError::InvalidExpiresIn { value: None })));
}

#[tokio::test]
async fn disabled_provider_never_calls_out() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let mut config = service_config(&server);

	config.enabled = false;

	let provider = mock_provider(config);
	let err = provider.token().await.expect_err("Disabled provider must fail.");

	assert!(!provider.is_enabled());
	assert!(matches!(
		err,
		Error::Config(ConfigError::Disabled { feature: Feature::ServiceToService })
	));

	mock.assert_calls_async(0).await;
}

#[derive(Default)]
struct RecordingClient {
	requests: Mutex<Vec<FormRequest>>,
}
impl AuthHttpClient for RecordingClient {
	fn post_form(&self, request: FormRequest) -> HttpFuture<'_> {
		self.requests.lock().expect("Recorder lock should not be poisoned.").push(request);

		Box::pin(async {
			Ok(HttpReply { status: 200, body: TOKEN_BODY.as_bytes().to_vec() })
		})
	}
}

#[tokio::test]
async fn exchange_sends_grant_and_configured_scopes() {
	let config = AuthConfig::builder()
		.client_credentials(CLIENT_ID, CLIENT_SECRET)
		.token_endpoint("https://auth.mealplan.test/oauth2/token".parse().expect("URL should parse."))
		.build()
		.expect("Config should build.");
	let recorder = Arc::new(RecordingClient::default());
	let provider = ServiceTokenProvider::<RecordingClient>::with_http_client(config, recorder.clone());

	provider.token().await.expect("Recorded exchange should succeed.");

	let requests = recorder.requests.lock().expect("Recorder lock should not be poisoned.");
	let request = requests.first().expect("One request should be recorded.");

	assert_eq!(requests.len(), 1);
	assert_eq!(request.endpoint, Endpoint::Token);
	assert_eq!(request.url.as_str(), "https://auth.mealplan.test/oauth2/token");
	assert_eq!(request.client_id, CLIENT_ID);
	assert_eq!(request.client_secret.expose(), CLIENT_SECRET);
	assert_eq!(request.timeout, Duration::seconds(5));
	assert_eq!(
		request.form,
		vec![("grant_type", "client_credentials".to_owned()), ("scope", "read write".to_owned())]
	);
}
