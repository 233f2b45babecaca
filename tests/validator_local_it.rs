mod support;

// crates.io
use serde_json::json;
// self
use mealplan_auth::{
	auth::TokenKind,
	config::AuthConfig,
	error::{ConfigError, Error, Feature, TokenError},
	validator::{TokenValidator, ValidationStrategy},
};
use support::*;

#[tokio::test]
async fn valid_token_maps_claims_to_identity() {
	let validator = TokenValidator::new(local_config());
	let claims = access_claims("user-123", &["read", "write"]);
	let user = validator
		.validate(&sign(&claims))
		.await
		.expect("Correctly signed access token should validate.");

	assert_eq!(validator.strategy(), ValidationStrategy::LocalSignature);
	assert_eq!(user.id, "user-123");
	assert_eq!(user.subject, "user-123");
	assert_eq!(user.client_id, "meal-planner-web");
	assert_eq!(user.scopes.iter().collect::<Vec<_>>(), vec!["read", "write"]);
	assert_eq!(user.expires_at, claims["exp"].as_i64().expect("exp should be numeric."));
}

#[tokio::test]
async fn identity_scopes_follow_claim_order() {
	let validator = TokenValidator::new(local_config());
	let claims = access_claims("user-123", &["write", "read"]);
	let user = validator.validate(&sign(&claims)).await.expect("Token should validate.");

	assert_eq!(user.scopes.iter().collect::<Vec<_>>(), vec!["write", "read"]);
	assert_eq!(
		serde_json::to_value(&user).expect("Identity should serialize.")["scopes"],
		claims["scopes"]
	);
}

#[tokio::test]
async fn refresh_tokens_are_rejected_even_when_signed() {
	let validator = TokenValidator::new(local_config());
	let mut claims = access_claims("user-123", &["read"]);

	claims["tokenType"] = json!("refresh");

	let err = validator.validate(&sign(&claims)).await.expect_err("Refresh token must fail.");

	assert!(matches!(err, Error::Token(TokenError::WrongTokenType { found: TokenKind::Refresh })));
}

#[tokio::test]
async fn expired_tokens_fail_with_expiry_reason() {
	let validator = TokenValidator::new(local_config());
	let mut claims = access_claims("user-123", &["read"]);

	claims["exp"] = json!(now() - 5);

	let err = validator.validate(&sign(&claims)).await.expect_err("Expired token must fail.");

	assert!(matches!(err, Error::Token(TokenError::Expired)));
}

#[tokio::test]
async fn foreign_issuer_and_bad_signature_are_distinguished() {
	let validator = TokenValidator::new(local_config());
	let mut foreign = access_claims("user-123", &["read"]);

	foreign["iss"] = json!("https://evil.example.com");

	let err = validator.validate(&sign(&foreign)).await.expect_err("Foreign issuer must fail.");

	assert!(matches!(err, Error::Token(TokenError::IssuerMismatch { .. })));

	let forged = sign_with(&access_claims("user-123", &["read"]), "wrong-secret");
	let err = validator.validate(&forged).await.expect_err("Forged token must fail.");

	assert!(matches!(err, Error::Token(TokenError::InvalidSignature)));

	let err = validator.validate("definitely-not-a-jwt").await.expect_err("Garbage must fail.");

	assert!(matches!(err, Error::Token(TokenError::Invalid)));
}

#[tokio::test]
async fn missing_secret_or_issuer_fails_closed() {
	let no_secret = AuthConfig::builder()
		.expected_issuer(ISSUER)
		.build()
		.expect("Config without secret should still build.");
	let token = sign(&access_claims("user-123", &["read"]));
	let err = TokenValidator::new(no_secret)
		.validate(&token)
		.await
		.expect_err("Missing secret must fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingSigningSecret)));

	let no_issuer = AuthConfig::builder()
		.signing_secret(SIGNING_SECRET)
		.build()
		.expect("Config without issuer should still build.");
	let err = TokenValidator::new(no_issuer)
		.validate(&token)
		.await
		.expect_err("Missing issuer must fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingIssuer)));
}

#[tokio::test]
async fn disabled_subsystem_fails_closed() {
	let mut config = local_config();

	config.enabled = false;

	let token = sign(&access_claims("user-123", &["read"]));
	let err = TokenValidator::new(config)
		.validate(&token)
		.await
		.expect_err("Validator must fail closed when disabled.");

	assert!(matches!(err, Error::Config(ConfigError::Disabled { feature: Feature::Authentication })));
}
