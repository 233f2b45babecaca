//! Outbound service token with expiry-aware caching and single-flight refresh.
//!
//! [`ServiceTokenProvider`] keeps at most one client-credentials token per instance. The cached
//! expiry is the provider-reported lifetime minus a safety buffer, so the token is replaced
//! slightly before the identity provider would reject it. When the cache is stale, the first
//! caller takes the refresh lock and performs the exchange. Everyone arriving meanwhile waits
//! on the same lock and receives that exchange's outcome, failures included, so at most one
//! token request is ever outstanding and an outage costs one request per wave of callers.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::Secret,
	client::ServiceCredentialsClient,
	config::AuthConfig,
	error::{ConfigError, Feature},
	http::AuthHttpClient,
	obs::{self, AuthFlow, CacheEvent, CacheKind},
};

/// Provider backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestServiceTokenProvider = ServiceTokenProvider<ReqwestHttpClient>;

/// The cached outbound token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedServiceToken {
	/// Bearer token value.
	pub token: Secret,
	/// When the exchange that produced the token started.
	pub issued_at: OffsetDateTime,
	/// `issued_at + expires_in - buffer`.
	pub expires_at: OffsetDateTime,
}
impl CachedServiceToken {
	/// Builds a cache entry whose expiry is shortened by `buffer`.
	///
	/// A buffer at least as long as the lifetime yields an entry that is already stale.
	pub fn new(
		token: Secret,
		issued_at: OffsetDateTime,
		expires_in: Duration,
		buffer: Duration,
	) -> Self {
		Self { token, issued_at, expires_at: issued_at + expires_in - buffer }
	}

	/// Returns `true` while `now` precedes the buffered expiry.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}

	/// Lifetime left at `now`, clamped at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - now;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}

/// Cache state reported without exposing the token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTokenInfo {
	/// Whether service-to-service authentication is active.
	pub enabled: bool,
	/// Whether a token is cached at all.
	pub cached: bool,
	/// Whether the cached token is still usable.
	pub fresh: bool,
	/// When the cached token was requested.
	pub issued_at: Option<OffsetDateTime>,
	/// Buffered expiry of the cached token.
	pub expires_at: Option<OffsetDateTime>,
	/// Lifetime left before the buffered expiry.
	pub remaining: Option<Duration>,
}

/// `Authorization` header carrying the service token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHeader(Secret);
impl AuthorizationHeader {
	/// Header name.
	pub const NAME: &'static str = "Authorization";

	/// Returns `Bearer <token>`.
	pub fn value(&self) -> String {
		format!("Bearer {}", self.0.expose())
	}

	/// Returns the bare token.
	pub fn token(&self) -> &Secret {
		&self.0
	}
}
impl Debug for AuthorizationHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthorizationHeader").field(&"Bearer <redacted>").finish()
	}
}

/// Acquires and caches this service's own access token.
pub struct ServiceTokenProvider<C>
where
	C: ?Sized + AuthHttpClient,
{
	config: Arc<AuthConfig>,
	client: ServiceCredentialsClient<C>,
	cached: RwLock<Option<CachedServiceToken>>,
	// Outcome of the latest exchange, handed to callers that queued behind it.
	last_refresh: AsyncMutex<Option<Result<Secret>>>,
	completed_refreshes: AtomicU64,
}
impl<C> ServiceTokenProvider<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a provider that reaches the token endpoint through `http_client`.
	pub fn with_http_client(
		config: impl Into<Arc<AuthConfig>>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let config = config.into();
		let client = ServiceCredentialsClient::new(config.clone(), http_client.into());

		Self {
			config,
			client,
			cached: RwLock::new(None),
			last_refresh: AsyncMutex::new(None),
			completed_refreshes: AtomicU64::new(0),
		}
	}

	/// Returns a usable service token, fetching one if the cache is empty or stale.
	///
	/// Fails without any network call when service-to-service authentication is disabled.
	/// Callers that arrive while an exchange is in flight wait for it and get its outcome. A
	/// failure is shared that way, never cached: the next call after it starts a new exchange.
	/// Nothing is retried.
	pub async fn token(&self) -> Result<Secret> {
		obs::observe(AuthFlow::ServiceToken, "token", async {
			self.ensure_enabled()?;

			let observed = self.completed_refreshes.load(Ordering::Acquire);

			if let Some(token) = self.fresh_token(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let mut last_refresh = self.last_refresh.lock().await;

			// An exchange finished while this caller waited; its outcome is this caller's too.
			if let Some(outcome) = last_refresh
				.as_ref()
				.filter(|_| self.completed_refreshes.load(Ordering::Acquire) != observed)
			{
				return outcome.clone();
			}
			// The cache may have been filled between the fast path and the lock.
			if let Some(token) = self.fresh_token(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let outcome = self.refresh().await;

			*last_refresh = Some(outcome.clone());
			self.completed_refreshes.fetch_add(1, Ordering::Release);

			outcome
		})
		.await
	}

	/// Returns the `Authorization` header for outbound calls.
	pub async fn authorization_header(&self) -> Result<AuthorizationHeader> {
		self.token().await.map(AuthorizationHeader)
	}

	/// Drops the cached token unconditionally.
	///
	/// An exchange already in flight still hands its outcome to the callers waiting on it.
	pub fn clear_cache(&self) {
		if self.cached.write().take().is_some() {
			obs::record_cache_event(CacheKind::ServiceToken, CacheEvent::Evict, 1);
		}
		if let Some(mut last_refresh) = self.last_refresh.try_lock() {
			*last_refresh = None;
		}
	}

	/// Returns `true` when service-to-service authentication is active.
	pub fn is_enabled(&self) -> bool {
		self.config.service_to_service_active()
	}

	/// Reports the cache state as of now.
	pub fn token_info(&self) -> ServiceTokenInfo {
		self.token_info_at(OffsetDateTime::now_utc())
	}

	/// Reports the cache state as of `now`.
	pub fn token_info_at(&self, now: OffsetDateTime) -> ServiceTokenInfo {
		let cached = self.cached.read();
		let entry = cached.as_ref();

		ServiceTokenInfo {
			enabled: self.is_enabled(),
			cached: entry.is_some(),
			fresh: entry.is_some_and(|entry| entry.is_fresh_at(now)),
			issued_at: entry.map(|entry| entry.issued_at),
			expires_at: entry.map(|entry| entry.expires_at),
			remaining: entry.map(|entry| entry.remaining_at(now)),
		}
	}

	fn ensure_enabled(&self) -> Result<()> {
		if self.is_enabled() {
			Ok(())
		} else {
			Err(ConfigError::Disabled { feature: Feature::ServiceToService }.into())
		}
	}

	async fn refresh(&self) -> Result<Secret> {
		obs::record_cache_event(CacheKind::ServiceToken, CacheEvent::Miss, 1);

		let issued_at = OffsetDateTime::now_utc();
		let response = self.client.fetch().await?;
		let entry = CachedServiceToken::new(
			response.access_token.clone(),
			issued_at,
			response.expires_in()?,
			self.config.token_expiry_buffer,
		);
		let token = entry.token.clone();

		*self.cached.write() = Some(entry);
		obs::record_cache_event(CacheKind::ServiceToken, CacheEvent::Store, 1);

		Ok(token)
	}

	fn fresh_token(&self, now: OffsetDateTime) -> Option<Secret> {
		let token = self
			.cached
			.read()
			.as_ref()
			.filter(|entry| entry.is_fresh_at(now))
			.map(|entry| entry.token.clone());

		if token.is_some() {
			obs::record_cache_event(CacheKind::ServiceToken, CacheEvent::Hit, 1);
		}

		token
	}
}
#[cfg(feature = "reqwest")]
impl ServiceTokenProvider<ReqwestHttpClient> {
	/// Creates a provider backed by a default reqwest client.
	pub fn new(config: impl Into<Arc<AuthConfig>>) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for ServiceTokenProvider<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceTokenProvider")
			.field("client", &self.client)
			.field("info", &self.token_info())
			.finish()
	}
}
