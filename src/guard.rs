//! Request-time authorization policies built on [`TokenValidator`](crate::validator::TokenValidator).
//!
//! Guards are framework-agnostic: anything implementing [`GuardRequest`] can be checked. On
//! success the resolved [`AuthenticatedUser`] is attached to the request and also returned in
//! the [`Access`] decision, so handlers receive the identity explicitly.

pub mod service;
pub mod user;

pub use service::*;
pub use user::*;

// self
use crate::{_prelude::*, auth::AuthenticatedUser};

/// Header carrying the bearer credential (lowercase, as normalized by [`InboundRequest`]).
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Header a local developer may use to pick the synthesized identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The request surface a guard needs.
pub trait GuardRequest {
	/// Looks up a header value; `name` is matched case-insensitively.
	fn header(&self, name: &str) -> Option<&str>;

	/// Stores the resolved identity for downstream handlers.
	fn attach_identity(&mut self, user: AuthenticatedUser);
}

/// Minimal owned request used by tests and simple embedders.
#[derive(Clone, Debug, Default)]
pub struct InboundRequest {
	headers: HashMap<String, String>,
	identity: Option<AuthenticatedUser>,
}
impl InboundRequest {
	/// Creates a request without headers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// Identity attached by a guard, if any.
	pub fn identity(&self) -> Option<&AuthenticatedUser> {
		self.identity.as_ref()
	}

	/// Takes the attached identity out of the request.
	pub fn take_identity(&mut self) -> Option<AuthenticatedUser> {
		self.identity.take()
	}
}
impl GuardRequest for InboundRequest {
	fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	fn attach_identity(&mut self, user: AuthenticatedUser) {
		self.identity = Some(user);
	}
}

/// A guard's allow decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
	/// The presented token was validated.
	Authenticated(AuthenticatedUser),
	/// Authentication is disabled; a local development identity was synthesized.
	LocalBypass(AuthenticatedUser),
	/// The guard is disabled and lets the request through without an identity.
	Open,
}
impl Access {
	/// Identity carried by the decision, if any.
	pub fn user(&self) -> Option<&AuthenticatedUser> {
		match self {
			Self::Authenticated(user) | Self::LocalBypass(user) => Some(user),
			Self::Open => None,
		}
	}
}

/// Coarse, outward-facing rejection reasons.
///
/// The precise validation failure is logged, never returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum GuardRejection {
	/// No bearer token was presented to the end-user guard.
	#[error("No token provided")]
	NoToken,
	/// The service guard received no `Bearer <token>` header.
	#[error("Missing or invalid authorization header")]
	InvalidHeader,
	/// The end-user token did not validate.
	#[error("Authentication failed")]
	AuthenticationFailed,
	/// The service token did not validate.
	#[error("Service authentication failed")]
	ServiceAuthenticationFailed,
	/// The token validated but lacks the required scopes.
	#[error("Insufficient permissions")]
	InsufficientPermissions,
}
impl GuardRejection {
	/// HTTP status a transport layer should answer with.
	pub const fn status_code(self) -> u16 {
		match self {
			Self::InsufficientPermissions => 403,
			_ => 401,
		}
	}
}

/// Extracts `<token>` from a well-formed `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
	let token = header.strip_prefix("Bearer ")?;

	if token.is_empty() || token.chars().any(char::is_whitespace) {
		return None;
	}

	Some(token)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_token_requires_the_exact_scheme() {
		assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
		assert_eq!(bearer_token("Basic xyz"), None);
		assert_eq!(bearer_token("Bearer "), None);
		assert_eq!(bearer_token("Bearer  abc"), None);
		assert_eq!(bearer_token("bearer abc"), None);
		assert_eq!(bearer_token("Bearer"), None);
	}

	#[test]
	fn headers_are_case_insensitive() {
		let request = InboundRequest::new().with_header("Authorization", "Bearer t");

		assert_eq!(request.header(AUTHORIZATION_HEADER), Some("Bearer t"));
		assert_eq!(request.header("AUTHORIZATION"), Some("Bearer t"));
		assert_eq!(request.header(USER_ID_HEADER), None);
	}

	#[test]
	fn rejections_use_coarse_messages_and_statuses() {
		assert_eq!(GuardRejection::InvalidHeader.to_string(), "Missing or invalid authorization header");
		assert_eq!(GuardRejection::ServiceAuthenticationFailed.to_string(), "Service authentication failed");
		assert_eq!(GuardRejection::InsufficientPermissions.to_string(), "Insufficient permissions");
		assert_eq!(GuardRejection::InsufficientPermissions.status_code(), 403);
		assert_eq!(GuardRejection::NoToken.status_code(), 401);
	}
}
