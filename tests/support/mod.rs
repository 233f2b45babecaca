#![allow(dead_code)]

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::MockServer;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use mealplan_auth::{
	config::AuthConfig,
	http::ReqwestHttpClient,
	reqwest::{Client, redirect::Policy},
	service_token::ReqwestServiceTokenProvider,
	url::Url,
	validator::ReqwestTokenValidator,
};

pub const SIGNING_SECRET: &str = "integration-signing-secret";
pub const ISSUER: &str = "https://auth.mealplan.test";
pub const CLIENT_ID: &str = "meal-plan-service";
pub const CLIENT_SECRET: &str = "meal-plan-secret";

pub fn now() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

/// Claims for a well-formed access token expiring in an hour.
pub fn access_claims(subject: &str, scopes: &[&str]) -> Value {
	json!({
		"iss": ISSUER,
		"aud": "meal-plans",
		"sub": subject,
		"clientId": "meal-planner-web",
		"userId": subject,
		"scopes": scopes,
		"tokenType": "access",
		"exp": now() + 3600,
		"iat": now(),
		"jti": format!("jti-{subject}"),
	})
}

/// Reqwest transport that trusts the self-signed certificate `httpmock` serves.
pub fn mock_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn mock_validator(config: AuthConfig) -> ReqwestTokenValidator {
	ReqwestTokenValidator::with_http_client(config, mock_http_client())
}

pub fn mock_provider(config: AuthConfig) -> ReqwestServiceTokenProvider {
	ReqwestServiceTokenProvider::with_http_client(config, mock_http_client())
}

pub fn sign(claims: &Value) -> String {
	sign_with(claims, SIGNING_SECRET)
}

pub fn sign_with(claims: &Value, secret: &str) -> String {
	encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
		.expect("Test token should encode.")
}

pub fn local_config() -> AuthConfig {
	AuthConfig::builder()
		.introspection_enabled(false)
		.signing_secret(SIGNING_SECRET)
		.expected_issuer(ISSUER)
		.build()
		.expect("Local config should build.")
}

pub fn remote_config(server: &MockServer, ttl: Duration) -> AuthConfig {
	AuthConfig::builder()
		.introspection_enabled(true)
		.client_credentials(CLIENT_ID, CLIENT_SECRET)
		.authority(Url::parse(&server.base_url()).expect("Mock server URL should parse."))
		.introspection_cache_ttl(ttl)
		.build()
		.expect("Remote config should build.")
}

pub fn service_config(server: &MockServer) -> AuthConfig {
	AuthConfig::builder()
		.client_credentials(CLIENT_ID, CLIENT_SECRET)
		.authority(Url::parse(&server.base_url()).expect("Mock server URL should parse."))
		.build()
		.expect("Service config should build.")
}

/// Expected `Authorization` value for this service's own client credentials.
pub fn basic_auth() -> String {
	format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")))
}
