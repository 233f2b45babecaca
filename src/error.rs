//! Error taxonomy shared by the validator, the service-token provider, and the HTTP clients.

// self
use crate::{
	_prelude::*,
	auth::{ScopeValidationError, TokenKind},
	client::Endpoint,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Cloneable so a failed service-token refresh can be handed to every caller that waited on it.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem or a disabled feature; always fails closed.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The presented token was rejected.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The identity provider answered, but not with a usable response.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns `true` when the failure concerns the presented token itself rather than
	/// configuration or the identity provider.
	pub fn is_token_rejection(&self) -> bool {
		matches!(self, Self::Token(_))
	}
}

/// Feature switches that can administratively disable part of the subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
	/// The whole authentication subsystem.
	Authentication,
	/// Service-to-service authentication (outbound tokens and the service guard).
	ServiceToService,
}
impl Feature {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Authentication => "authentication",
			Self::ServiceToService => "service_to_service",
		}
	}
}
impl Display for Feature {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration failures and disabled features.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// The requested feature is switched off.
	#[error("The {feature} feature is disabled.")]
	Disabled {
		/// Feature that is switched off.
		feature: Feature,
	},
	/// Local verification was selected but no shared secret is configured.
	#[error("No signing secret is configured for local token verification.")]
	MissingSigningSecret,
	/// Local verification was selected but no expected issuer is configured.
	#[error("No expected issuer is configured for local token verification.")]
	MissingIssuer,
	/// This service's own client id or secret is missing.
	#[error("Client credentials are not configured.")]
	MissingClientCredentials,
	/// An identity-provider endpoint is missing.
	#[error("The {endpoint} endpoint is not configured.")]
	MissingEndpoint {
		/// Endpoint that has no URL.
		endpoint: Endpoint,
	},
	/// A configuration value holds an unparsable URL.
	#[error("Configuration key `{key}` holds an invalid URL.")]
	InvalidEndpoint {
		/// Offending configuration key.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configuration value cannot be interpreted.
	#[error("Configuration key `{key}` holds an invalid value: {value}.")]
	InvalidValue {
		/// Offending configuration key.
		key: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Configured service scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Reasons a presented token is rejected.
///
/// The variants stay specific for local logging; guards collapse them into coarse
/// outward-facing messages.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenError {
	/// Signature verification failed.
	#[error("Token signature is invalid.")]
	InvalidSignature,
	/// Token could not be decoded (malformed, unsupported, or otherwise unusable).
	#[error("Token is invalid or expired.")]
	Invalid,
	/// A refresh token was presented where an access token is required.
	#[error("Expected an access token but received a {found} token.")]
	WrongTokenType {
		/// Token type carried by the claims.
		found: TokenKind,
	},
	/// Issuer claim does not match the configured issuer.
	#[error("Token issuer `{found}` does not match the expected issuer.")]
	IssuerMismatch {
		/// Issuer carried by the claims.
		found: String,
	},
	/// Expiry is not strictly in the future.
	#[error("Token has expired.")]
	Expired,
	/// Not-before lies in the future.
	#[error("Token is not valid yet.")]
	NotYetValid,
	/// Introspection reported the token as inactive.
	#[error("Token is not active.")]
	Inactive,
	/// The identity provider could not vouch for the token; the cause is deliberately hidden.
	#[error("Token could not be verified.")]
	Unverifiable,
}

/// Transport-level failures (network, timeouts).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// The bounded request timeout elapsed.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint being called.
		endpoint: Endpoint,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Arc::new(src) }
	}
}

/// Unusable responses from the identity provider.
#[derive(Clone, Debug, ThisError)]
pub enum UpstreamError {
	/// The endpoint rejected this service's own client credentials (HTTP 401).
	#[error("The {endpoint} endpoint rejected the client credentials.")]
	InvalidClient {
		/// Endpoint being called.
		endpoint: Endpoint,
	},
	/// The endpoint answered with a non-success status other than 401.
	#[error("The {endpoint} endpoint responded with HTTP {status}.")]
	Status {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// HTTP status code.
		status: u16,
	},
	/// The endpoint responded with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// The token endpoint omitted `expires_in` or returned a non-positive value.
	#[error("The token endpoint returned an unusable expires_in value.")]
	InvalidExpiresIn {
		/// Value received, if any.
		value: Option<i64>,
	},
}
