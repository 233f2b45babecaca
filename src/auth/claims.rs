//! Claims carried by locally verified access tokens.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, auth::ScopeSet};

/// Token variants an identity provider may issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
	/// Short-lived access token accepted by resource servers.
	#[serde(rename = "access", alias = "access_token")]
	Access,
	/// Refresh token; never valid as a bearer credential.
	#[serde(rename = "refresh", alias = "refresh_token")]
	Refresh,
}
impl TokenKind {
	/// Returns a stable label suitable for logs and errors.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Access => "access",
			Self::Refresh => "refresh",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decoded payload of a signed access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Issuer (`iss`).
	#[serde(rename = "iss")]
	pub issuer: String,
	/// Audience (`aud`), accepted as a single string or an array.
	#[serde(
		rename = "aud",
		default,
		deserialize_with = "one_or_many",
		skip_serializing_if = "BTreeSet::is_empty"
	)]
	pub audience: BTreeSet<String>,
	/// Subject (`sub`).
	#[serde(rename = "sub")]
	pub subject: String,
	/// OAuth client the token was issued to.
	#[serde(default, alias = "clientId")]
	pub client_id: String,
	/// Resource-owner identifier, when distinct from the subject.
	#[serde(default, alias = "userId")]
	pub user_id: String,
	/// Granted scopes.
	#[serde(default)]
	pub scopes: ScopeSet,
	/// Access or refresh.
	#[serde(alias = "tokenType")]
	pub token_type: TokenKind,
	/// Expiry (`exp`) in epoch seconds.
	#[serde(rename = "exp")]
	pub expires_at: i64,
	/// Issued-at (`iat`) in epoch seconds.
	#[serde(rename = "iat", default)]
	pub issued_at: i64,
	/// Not-before (`nbf`) in epoch seconds.
	#[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
	pub not_before: Option<i64>,
	/// Token identifier (`jti`).
	#[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
	pub token_id: Option<String>,
}
impl TokenClaims {
	/// Returns `true` for access tokens.
	pub fn is_access_token(&self) -> bool {
		matches!(self.token_type, TokenKind::Access)
	}

	/// Returns `true` once `now` (epoch seconds) reaches the expiry.
	pub fn is_expired_at(&self, now: i64) -> bool {
		self.expires_at <= now
	}

	/// Returns `true` while `now` (epoch seconds) precedes the not-before instant.
	pub fn is_premature_at(&self, now: i64) -> bool {
		self.not_before.is_some_and(|nbf| nbf > now)
	}
}

/// Accepts either `"aud"` or `["aud", ...]`.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(value) => BTreeSet::from([value]),
		OneOrMany::Many(values) => values.into_iter().collect(),
	})
}
