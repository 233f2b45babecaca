//! Bearer-token validation with a deployment-wide strategy.
//!
//! A [`TokenValidator`] either verifies HS256 tokens locally or delegates to the identity
//! provider's introspection endpoint, caching every response (including inactive ones) for the
//! configured TTL. The validator always fails closed; bypass decisions belong to
//! [`guard`](crate::guard).

pub mod cache;

pub use cache::*;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{AuthenticatedUser, TokenClaims},
	client::IntrospectionClient,
	codec::TokenCodec,
	config::AuthConfig,
	error::{ConfigError, Feature, TokenError},
	http::AuthHttpClient,
	obs::{self, AuthFlow, CacheEvent, CacheKind},
};

/// Validator backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestTokenValidator = TokenValidator<ReqwestHttpClient>;

/// How presented tokens are verified. Chosen once from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationStrategy {
	/// Verify the HS256 signature and claims in-process.
	LocalSignature,
	/// Ask the identity provider through introspection.
	RemoteIntrospection,
}
impl ValidationStrategy {
	/// Picks the strategy `config` selects.
	pub fn from_config(config: &AuthConfig) -> Self {
		if config.introspection_enabled { Self::RemoteIntrospection } else { Self::LocalSignature }
	}
}

enum Verifier<C>
where
	C: ?Sized + AuthHttpClient,
{
	Local(Option<TokenCodec>),
	Remote(IntrospectionClient<C>),
}

/// Validates bearer tokens and owns the introspection cache.
pub struct TokenValidator<C>
where
	C: ?Sized + AuthHttpClient,
{
	config: Arc<AuthConfig>,
	verifier: Verifier<C>,
	cache: IntrospectionCache,
}
impl<C> TokenValidator<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a validator that reaches the identity provider through `http_client`.
	pub fn with_http_client(
		config: impl Into<Arc<AuthConfig>>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let config = config.into();
		let verifier = match ValidationStrategy::from_config(&config) {
			ValidationStrategy::LocalSignature => Verifier::Local(
				config
					.signing_secret
					.as_ref()
					.filter(|secret| !secret.is_empty())
					.map(TokenCodec::hs256),
			),
			ValidationStrategy::RemoteIntrospection =>
				Verifier::Remote(IntrospectionClient::new(config.clone(), http_client.into())),
		};

		Self { config, verifier, cache: IntrospectionCache::default() }
	}

	/// Validates `token` and maps it to the canonical identity.
	///
	/// Fails with [`ConfigError::Disabled`] when authentication is switched off. Local failures
	/// keep their specific [`TokenError`]; every remote failure other than an inactive token
	/// becomes [`TokenError::Unverifiable`].
	pub async fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
		match &self.verifier {
			Verifier::Local(codec) =>
				obs::observe(AuthFlow::LocalValidation, "validate", async {
					self.ensure_enabled()?;
					self.validate_local(codec.as_ref(), token, OffsetDateTime::now_utc())
				})
				.await,
			Verifier::Remote(client) =>
				obs::observe(AuthFlow::Introspection, "validate", async {
					self.ensure_enabled()?;
					self.validate_remote(client, token).await
				})
				.await,
		}
	}

	/// Drops introspection entries that are past their TTL; returns how many were removed.
	///
	/// Nothing calls this automatically; schedule it externally.
	pub fn purge_expired(&self) -> usize {
		let removed = self.cache.purge_expired_at(OffsetDateTime::now_utc());

		obs::record_cache_event(CacheKind::Introspection, CacheEvent::Evict, removed as u64);

		removed
	}

	/// Drops every cached introspection response; returns how many were removed.
	pub fn clear_cache(&self) -> usize {
		let removed = self.cache.clear();

		obs::record_cache_event(CacheKind::Introspection, CacheEvent::Evict, removed as u64);

		removed
	}

	/// Number of cached introspection responses, fresh or stale.
	pub fn cached_entries(&self) -> usize {
		self.cache.len()
	}

	/// Strategy selected at construction.
	pub fn strategy(&self) -> ValidationStrategy {
		match self.verifier {
			Verifier::Local(_) => ValidationStrategy::LocalSignature,
			Verifier::Remote(_) => ValidationStrategy::RemoteIntrospection,
		}
	}

	/// Configuration snapshot shared with the guards.
	pub fn config(&self) -> &Arc<AuthConfig> {
		&self.config
	}

	fn ensure_enabled(&self) -> Result<()> {
		if self.config.enabled {
			Ok(())
		} else {
			Err(ConfigError::Disabled { feature: Feature::Authentication }.into())
		}
	}

	fn validate_local(
		&self,
		codec: Option<&TokenCodec>,
		token: &str,
		now: OffsetDateTime,
	) -> Result<AuthenticatedUser> {
		let codec = codec.ok_or(ConfigError::MissingSigningSecret)?;
		let issuer = self
			.config
			.expected_issuer
			.as_deref()
			.filter(|issuer| !issuer.is_empty())
			.ok_or(ConfigError::MissingIssuer)?;

		if token.is_empty() {
			return Err(TokenError::Invalid.into());
		}

		let claims = codec.verify(token)?;

		check_claims(&claims, issuer, now.unix_timestamp())?;

		Ok(claims.into())
	}

	async fn validate_remote(
		&self,
		client: &IntrospectionClient<C>,
		token: &str,
	) -> Result<AuthenticatedUser> {
		if token.is_empty() {
			return Err(TokenError::Invalid.into());
		}

		let key = CacheKey::derive(token);
		let result = match self.cache.get_fresh_at(&key, OffsetDateTime::now_utc()) {
			Some(hit) => {
				obs::record_cache_event(CacheKind::Introspection, CacheEvent::Hit, 1);

				hit
			},
			None => {
				obs::record_cache_event(CacheKind::Introspection, CacheEvent::Miss, 1);

				let fetched = client.introspect(token).await.map_err(|e| {
					obs::trace_failure(AuthFlow::Introspection, &e);

					TokenError::Unverifiable
				})?;

				self.cache.insert(
					key,
					fetched.clone(),
					OffsetDateTime::now_utc() + self.config.introspection_cache_ttl,
				);
				obs::record_cache_event(CacheKind::Introspection, CacheEvent::Store, 1);

				fetched
			},
		};

		if !result.active {
			return Err(TokenError::Inactive.into());
		}

		Ok(result.into())
	}
}
#[cfg(feature = "reqwest")]
impl TokenValidator<ReqwestHttpClient> {
	/// Creates a validator backed by a default reqwest client.
	pub fn new(config: impl Into<Arc<AuthConfig>>) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for TokenValidator<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenValidator")
			.field("strategy", &self.strategy())
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}

/// Checks decoded claims in a fixed order: type, issuer, expiry, not-before.
fn check_claims(claims: &TokenClaims, issuer: &str, now: i64) -> Result<(), TokenError> {
	if !claims.is_access_token() {
		return Err(TokenError::WrongTokenType { found: claims.token_type });
	}
	if claims.issuer != issuer {
		return Err(TokenError::IssuerMismatch { found: claims.issuer.clone() });
	}
	if claims.is_expired_at(now) {
		return Err(TokenError::Expired);
	}
	if claims.is_premature_at(now) {
		return Err(TokenError::NotYetValid);
	}

	Ok(())
}
