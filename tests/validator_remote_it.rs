mod support;

// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use mealplan_auth::{
	config::AuthConfig,
	error::{Error, TokenError},
	url::Url,
	validator::ValidationStrategy,
};
use support::*;

const ACTIVE_BODY: &str = "{\"active\":true,\"sub\":\"user-77\",\"client_id\":\"meal-planner-web\",\"scope\":\"read write\",\"exp\":4102444800,\"username\":\"ada\"}";

#[tokio::test]
async fn active_result_is_cached_within_ttl() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/introspect")
				.header("authorization", basic_auth())
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(ACTIVE_BODY);
		})
		.await;
	let validator = mock_validator(remote_config(&server, Duration::minutes(5)));
	let first = validator.validate("opaque-token-1").await.expect("Active token should validate.");
	let second = validator.validate("opaque-token-1").await.expect("Cached token should validate.");

	assert_eq!(validator.strategy(), ValidationStrategy::RemoteIntrospection);
	assert_eq!(first, second);
	assert_eq!(first.id, "user-77");
	assert_eq!(first.client_id, "meal-planner-web");
	assert_eq!(first.expires_at, 4102444800);
	assert!(first.has_scope("write"));
	assert_eq!(validator.cached_entries(), 1);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn inactive_result_is_negatively_cached() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/introspect");
			then.status(200).header("content-type", "application/json").body("{\"active\":false}");
		})
		.await;
	let validator = mock_validator(remote_config(&server, Duration::minutes(5)));

	for _ in 0..3 {
		let err = validator.validate("revoked-token").await.expect_err("Inactive token must fail.");

		assert!(matches!(err, Error::Token(TokenError::Inactive)));
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn stale_entries_are_refetched_and_replaced() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/introspect");
			then.status(200).header("content-type", "application/json").body(ACTIVE_BODY);
		})
		.await;
	let validator = mock_validator(remote_config(&server, Duration::ZERO));

	validator.validate("short-lived").await.expect("First lookup should succeed.");
	validator.validate("short-lived").await.expect("Second lookup should succeed.");

	mock.assert_calls_async(2).await;

	assert_eq!(validator.cached_entries(), 1, "The stale entry is replaced, not duplicated.");
	assert_eq!(validator.purge_expired(), 1);
	assert_eq!(validator.cached_entries(), 0);
}

#[tokio::test]
async fn upstream_failures_collapse_to_unverifiable() {
	let server = MockServer::start_async().await;
	let unauthorized = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/introspect")
				.body("token=bad-client&token_type_hint=access_token");
			then.status(401);
		})
		.await;
	let broken = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/introspect")
				.body("token=server-error&token_type_hint=access_token");
			then.status(500).body("boom");
		})
		.await;
	let validator = mock_validator(remote_config(&server, Duration::minutes(5)));

	for token in ["bad-client", "server-error"] {
		let err = validator.validate(token).await.expect_err("Upstream failure must fail closed.");

		assert!(matches!(err, Error::Token(TokenError::Unverifiable)));
	}

	unauthorized.assert_calls_async(1).await;
	broken.assert_calls_async(1).await;

	assert_eq!(validator.cached_entries(), 0, "Failures are never cached.");
}

#[tokio::test]
async fn unreachable_provider_is_unverifiable() {
	let config = AuthConfig::builder()
		.introspection_enabled(true)
		.client_credentials(CLIENT_ID, CLIENT_SECRET)
		.introspection_endpoint(
			Url::parse("http://127.0.0.1:1/oauth2/introspect").expect("URL should parse."),
		)
		.request_timeout(Duration::seconds(2))
		.build()
		.expect("Config should build.");
	let err = mock_validator(config)
		.validate("any-token")
		.await
		.expect_err("Unreachable provider must fail closed.");

	assert!(matches!(err, Error::Token(TokenError::Unverifiable)));
}

#[tokio::test]
async fn clear_cache_forces_a_new_lookup() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/introspect");
			then.status(200).header("content-type", "application/json").body(ACTIVE_BODY);
		})
		.await;
	let validator = mock_validator(remote_config(&server, Duration::minutes(5)));

	validator.validate("token-a").await.expect("Lookup should succeed.");

	assert_eq!(validator.clear_cache(), 1);

	validator.validate("token-a").await.expect("Lookup after clear should succeed.");

	mock.assert_calls_async(2).await;
}
