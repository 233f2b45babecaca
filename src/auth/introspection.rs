//! Token introspection payloads (RFC 7662 response shape).

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, claims::one_or_many},
};

/// Response returned by the introspection endpoint.
///
/// Nothing in here is trusted until `active` is `true`; a missing `active` field is read as
/// `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionResult {
	/// Whether the identity provider considers the token usable.
	#[serde(default)]
	pub active: bool,
	/// OAuth client the token was issued to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Human-readable resource-owner identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Space-delimited granted scopes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Token type reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Expiry (`exp`) in epoch seconds.
	#[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<i64>,
	/// Issued-at (`iat`) in epoch seconds.
	#[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
	pub issued_at: Option<i64>,
	/// Subject (`sub`).
	#[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
	/// Audience (`aud`).
	#[serde(
		rename = "aud",
		default,
		deserialize_with = "one_or_many",
		skip_serializing_if = "BTreeSet::is_empty"
	)]
	pub audience: BTreeSet<String>,
	/// Issuer (`iss`).
	#[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
	pub issuer: Option<String>,
}
impl IntrospectionResult {
	/// Builds the canonical inactive response.
	pub fn inactive() -> Self {
		Self::default()
	}

	/// Granted scopes; an absent or blank `scope` yields an empty set.
	pub fn scopes(&self) -> ScopeSet {
		self.scope.as_deref().map(ScopeSet::from_delimited).unwrap_or_default()
	}
}
