//! The identity attached to a request once a guard lets it through.

// self
use crate::{
	_prelude::*,
	auth::{IntrospectionResult, ScopeSet, TokenClaims},
};

/// Canonical authenticated identity.
///
/// Serializes as `{id, sub, clientId, scopes, exp}` for downstream handlers. `id` is never
/// absent: it falls back from the subject to the username and finally to an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
	/// Stable identifier used by handlers.
	pub id: String,
	/// Subject the token was issued for.
	#[serde(rename = "sub")]
	pub subject: String,
	/// OAuth client the token was issued to.
	#[serde(rename = "clientId")]
	pub client_id: String,
	/// Granted scopes.
	pub scopes: ScopeSet,
	/// Expiry in epoch seconds (`0` when unknown).
	#[serde(rename = "exp")]
	pub expires_at: i64,
}
impl AuthenticatedUser {
	/// Returns `true` if the identity carries `scope`.
	pub fn has_scope(&self, scope: &str) -> bool {
		self.scopes.contains(scope)
	}

	/// Returns `true` if the identity carries at least one of `scopes`.
	pub fn has_any_scope<'a, I>(&self, scopes: I) -> bool
	where
		I: IntoIterator<Item = &'a str>,
	{
		self.scopes.contains_any(scopes)
	}
}
impl From<TokenClaims> for AuthenticatedUser {
	fn from(claims: TokenClaims) -> Self {
		let id = if claims.subject.is_empty() { claims.user_id } else { claims.subject.clone() };

		Self {
			id,
			subject: claims.subject,
			client_id: claims.client_id,
			scopes: claims.scopes,
			expires_at: claims.expires_at,
		}
	}
}
impl From<IntrospectionResult> for AuthenticatedUser {
	fn from(result: IntrospectionResult) -> Self {
		let scopes = result.scopes();
		let subject = result.subject.unwrap_or_default();
		let id = if subject.is_empty() { result.username.unwrap_or_default() } else { subject.clone() };

		Self {
			id,
			subject,
			client_id: result.client_id.unwrap_or_default(),
			scopes,
			expires_at: result.expires_at.unwrap_or(0),
		}
	}
}
