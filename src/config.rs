//! Typed configuration snapshot for the authentication subsystem.
//!
//! Every component reads the same [`AuthConfig`] value, built once either through
//! [`AuthConfig::builder`] or from environment-style keys via [`AuthConfig::from_lookup`].

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
	error::ConfigError,
};

/// Environment keys understood by [`AuthConfig::from_lookup`].
pub mod keys {
	/// Master switch for the whole subsystem.
	pub const ENABLED: &str = "AUTH_ENABLED";
	/// Switch for service-to-service authentication.
	pub const SERVICE_TO_SERVICE_ENABLED: &str = "AUTH_SERVICE_TO_SERVICE_ENABLED";
	/// Selects remote introspection instead of local signature verification.
	pub const INTROSPECTION_ENABLED: &str = "AUTH_INTROSPECTION_ENABLED";
	/// This service's client id.
	pub const CLIENT_ID: &str = "AUTH_CLIENT_ID";
	/// This service's client secret.
	pub const CLIENT_SECRET: &str = "AUTH_CLIENT_SECRET";
	/// Introspection cache TTL in seconds.
	pub const INTROSPECTION_CACHE_TTL: &str = "AUTH_INTROSPECTION_CACHE_TTL";
	/// Shared HS256 signing secret.
	pub const JWT_SECRET: &str = "AUTH_JWT_SECRET";
	/// Expected `iss` claim.
	pub const EXPECTED_ISSUER: &str = "AUTH_EXPECTED_ISSUER";
	/// Identity-provider base URL.
	pub const SERVER_URL: &str = "AUTH_SERVER_URL";
	/// Token endpoint override.
	pub const TOKEN_ENDPOINT: &str = "AUTH_TOKEN_ENDPOINT";
	/// Introspection endpoint override.
	pub const INTROSPECTION_ENDPOINT: &str = "AUTH_INTROSPECTION_ENDPOINT";
	/// Space-delimited scopes requested for service tokens.
	pub const SERVICE_SCOPES: &str = "AUTH_SERVICE_SCOPES";
	/// Safety buffer subtracted from service-token lifetimes, in seconds.
	pub const TOKEN_EXPIRY_BUFFER: &str = "AUTH_TOKEN_EXPIRY_BUFFER";
	/// Outbound request timeout in seconds.
	pub const REQUEST_TIMEOUT: &str = "AUTH_REQUEST_TIMEOUT";
}

/// Immutable configuration snapshot.
#[derive(Clone, Debug)]
pub struct AuthConfig {
	/// Master switch; when off the validator fails closed and guards bypass.
	pub enabled: bool,
	/// Service-to-service switch (outbound tokens and the service guard).
	pub service_to_service_enabled: bool,
	/// Remote introspection when `true`, local signature verification otherwise.
	pub introspection_enabled: bool,
	/// This service's client id.
	pub client_id: Option<String>,
	/// This service's client secret.
	pub client_secret: Option<Secret>,
	/// Lifetime of cached introspection responses.
	pub introspection_cache_ttl: Duration,
	/// Shared HS256 secret for local verification.
	pub signing_secret: Option<Secret>,
	/// Issuer every locally verified token must carry.
	pub expected_issuer: Option<String>,
	/// Client-credentials token endpoint.
	pub token_endpoint: Option<Url>,
	/// Introspection endpoint.
	pub introspection_endpoint: Option<Url>,
	/// Scopes requested for outbound service tokens.
	pub service_scopes: ScopeSet,
	/// Subtracted from `expires_in` so cached service tokens go stale early.
	pub token_expiry_buffer: Duration,
	/// Upper bound for every outbound HTTP call.
	pub request_timeout: Duration,
}
impl AuthConfig {
	/// Default lifetime of cached introspection responses.
	pub const DEFAULT_INTROSPECTION_CACHE_TTL: Duration = Duration::minutes(5);
	/// Default service-token safety buffer.
	pub const DEFAULT_TOKEN_EXPIRY_BUFFER: Duration = Duration::seconds(60);
	/// Default outbound request timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(5);
	/// Token endpoint path relative to the identity-provider base URL.
	pub const TOKEN_PATH: &'static str = "oauth2/token";
	/// Introspection endpoint path relative to the identity-provider base URL.
	pub const INTROSPECTION_PATH: &'static str = "oauth2/introspect";

	/// Creates a builder seeded with defaults.
	pub fn builder() -> AuthConfigBuilder {
		AuthConfigBuilder::default()
	}

	/// Reads the configuration from process environment variables (see [`keys`]).
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, which maps a key from [`keys`] to its raw value.
	///
	/// Unset keys keep their defaults. Blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let mut builder = Self::builder();

		if let Some(raw) = read(keys::ENABLED) {
			builder = builder.enabled(parse_flag(keys::ENABLED, &raw)?);
		}
		if let Some(raw) = read(keys::SERVICE_TO_SERVICE_ENABLED) {
			builder = builder
				.service_to_service_enabled(parse_flag(keys::SERVICE_TO_SERVICE_ENABLED, &raw)?);
		}
		if let Some(raw) = read(keys::INTROSPECTION_ENABLED) {
			builder =
				builder.introspection_enabled(parse_flag(keys::INTROSPECTION_ENABLED, &raw)?);
		}

		builder.client_id = read(keys::CLIENT_ID);
		builder.client_secret = read(keys::CLIENT_SECRET).map(Secret::from);

		if let Some(raw) = read(keys::INTROSPECTION_CACHE_TTL) {
			builder = builder
				.introspection_cache_ttl(parse_seconds(keys::INTROSPECTION_CACHE_TTL, &raw)?);
		}
		if let Some(raw) = read(keys::JWT_SECRET) {
			builder = builder.signing_secret(raw);
		}
		if let Some(raw) = read(keys::EXPECTED_ISSUER) {
			builder = builder.expected_issuer(raw);
		}
		if let Some(raw) = read(keys::SERVER_URL) {
			builder = builder.authority(parse_url(keys::SERVER_URL, &raw)?);
		}
		if let Some(raw) = read(keys::TOKEN_ENDPOINT) {
			builder = builder.token_endpoint(parse_url(keys::TOKEN_ENDPOINT, &raw)?);
		}
		if let Some(raw) = read(keys::INTROSPECTION_ENDPOINT) {
			builder =
				builder.introspection_endpoint(parse_url(keys::INTROSPECTION_ENDPOINT, &raw)?);
		}
		if let Some(raw) = read(keys::SERVICE_SCOPES) {
			builder = builder.service_scopes(ScopeSet::from_str(raw.trim())?);
		}
		if let Some(raw) = read(keys::TOKEN_EXPIRY_BUFFER) {
			builder =
				builder.token_expiry_buffer(parse_seconds(keys::TOKEN_EXPIRY_BUFFER, &raw)?);
		}
		if let Some(raw) = read(keys::REQUEST_TIMEOUT) {
			builder = builder.request_timeout(parse_seconds(keys::REQUEST_TIMEOUT, &raw)?);
		}

		builder.build()
	}

	/// Returns `true` when outbound service tokens and the service guard are active.
	pub fn service_to_service_active(&self) -> bool {
		self.enabled && self.service_to_service_enabled
	}

	/// Returns this service's own client id and secret.
	pub fn client_credentials(&self) -> Result<(&str, &Secret), ConfigError> {
		match (self.client_id.as_deref(), self.client_secret.as_ref()) {
			(Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
			_ => Err(ConfigError::MissingClientCredentials),
		}
	}
}
impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigBuilder::default().assemble(None, None)
	}
}

/// Builder for [`AuthConfig`] values.
#[derive(Clone, Debug)]
pub struct AuthConfigBuilder {
	/// Master switch.
	pub enabled: bool,
	/// Service-to-service switch.
	pub service_to_service_enabled: bool,
	/// Remote introspection switch.
	pub introspection_enabled: bool,
	/// This service's client id.
	pub client_id: Option<String>,
	/// This service's client secret.
	pub client_secret: Option<Secret>,
	/// Introspection cache TTL.
	pub introspection_cache_ttl: Duration,
	/// Shared HS256 secret.
	pub signing_secret: Option<Secret>,
	/// Expected `iss` claim.
	pub expected_issuer: Option<String>,
	/// Identity-provider base URL used to derive conventional endpoint paths.
	pub authority: Option<Url>,
	/// Explicit token endpoint; wins over the derived one.
	pub token_endpoint: Option<Url>,
	/// Explicit introspection endpoint; wins over the derived one.
	pub introspection_endpoint: Option<Url>,
	/// Scopes requested for outbound service tokens.
	pub service_scopes: ScopeSet,
	/// Service-token safety buffer.
	pub token_expiry_buffer: Duration,
	/// Outbound request timeout.
	pub request_timeout: Duration,
}
impl AuthConfigBuilder {
	/// Sets the master switch.
	pub fn enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;

		self
	}

	/// Sets the service-to-service switch.
	pub fn service_to_service_enabled(mut self, enabled: bool) -> Self {
		self.service_to_service_enabled = enabled;

		self
	}

	/// Selects remote introspection (`true`) or local verification (`false`).
	pub fn introspection_enabled(mut self, enabled: bool) -> Self {
		self.introspection_enabled = enabled;

		self
	}

	/// Sets this service's own client credentials.
	pub fn client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the introspection cache TTL.
	pub fn introspection_cache_ttl(mut self, ttl: Duration) -> Self {
		self.introspection_cache_ttl = ttl;

		self
	}

	/// Sets the shared HS256 secret.
	pub fn signing_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.signing_secret = Some(secret.into());

		self
	}

	/// Sets the issuer every local token must carry.
	pub fn expected_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.expected_issuer = Some(issuer.into());

		self
	}

	/// Sets the identity-provider base URL; endpoints default to `oauth2/token` and
	/// `oauth2/introspect` beneath it.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Sets an explicit token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets an explicit introspection endpoint.
	pub fn introspection_endpoint(mut self, url: Url) -> Self {
		self.introspection_endpoint = Some(url);

		self
	}

	/// Overrides the scopes requested for service tokens.
	pub fn service_scopes(mut self, scopes: ScopeSet) -> Self {
		self.service_scopes = scopes;

		self
	}

	/// Overrides the service-token safety buffer.
	pub fn token_expiry_buffer(mut self, buffer: Duration) -> Self {
		self.token_expiry_buffer = buffer;

		self
	}

	/// Overrides the outbound request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<AuthConfig, ConfigError> {
		if self.introspection_cache_ttl.is_negative() {
			return Err(invalid_duration(keys::INTROSPECTION_CACHE_TTL, self.introspection_cache_ttl));
		}
		if self.token_expiry_buffer.is_negative() {
			return Err(invalid_duration(keys::TOKEN_EXPIRY_BUFFER, self.token_expiry_buffer));
		}
		if !self.request_timeout.is_positive() {
			return Err(invalid_duration(keys::REQUEST_TIMEOUT, self.request_timeout));
		}

		let derived = match self.authority.as_ref() {
			Some(authority) => Some((
				endpoint_under(authority, AuthConfig::TOKEN_PATH)?,
				endpoint_under(authority, AuthConfig::INTROSPECTION_PATH)?,
			)),
			None => None,
		};
		let (token, introspection) = derived.unzip();

		Ok(self.assemble(token, introspection))
	}

	fn assemble(self, token: Option<Url>, introspection: Option<Url>) -> AuthConfig {
		AuthConfig {
			enabled: self.enabled,
			service_to_service_enabled: self.service_to_service_enabled,
			introspection_enabled: self.introspection_enabled,
			client_id: self.client_id,
			client_secret: self.client_secret,
			introspection_cache_ttl: self.introspection_cache_ttl,
			signing_secret: self.signing_secret,
			expected_issuer: self.expected_issuer,
			token_endpoint: self.token_endpoint.or(token),
			introspection_endpoint: self.introspection_endpoint.or(introspection),
			service_scopes: self.service_scopes,
			token_expiry_buffer: self.token_expiry_buffer,
			request_timeout: self.request_timeout,
		}
	}
}
impl Default for AuthConfigBuilder {
	fn default() -> Self {
		Self {
			enabled: true,
			service_to_service_enabled: true,
			introspection_enabled: false,
			client_id: None,
			client_secret: None,
			introspection_cache_ttl: AuthConfig::DEFAULT_INTROSPECTION_CACHE_TTL,
			signing_secret: None,
			expected_issuer: None,
			authority: None,
			token_endpoint: None,
			introspection_endpoint: None,
			service_scopes: ScopeSet::from_delimited("read write"),
			token_expiry_buffer: AuthConfig::DEFAULT_TOKEN_EXPIRY_BUFFER,
			request_timeout: AuthConfig::DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

fn endpoint_under(authority: &Url, path: &str) -> Result<Url, ConfigError> {
	let mut base = authority.clone();

	if !base.path().ends_with('/') {
		let with_slash = format!("{}/", base.path());

		base.set_path(&with_slash);
	}

	base.join(path).map_err(|source| ConfigError::InvalidEndpoint { key: keys::SERVER_URL, source })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue { key, value: raw.to_owned() }),
	}
}

fn parse_seconds(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
	raw.trim()
		.parse::<u32>()
		.map(|secs| Duration::seconds(i64::from(secs)))
		.map_err(|_| ConfigError::InvalidValue { key, value: raw.to_owned() })
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidEndpoint { key, source })
}

fn invalid_duration(key: &'static str, value: Duration) -> ConfigError {
	ConfigError::InvalidValue { key, value: value.to_string() }
}
