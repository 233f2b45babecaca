//! Compact signed-token verification against a shared HS256 secret.
//!
//! The codec only proves the token was signed with the configured secret and decodes its
//! claims. Expiry, not-before, token type, and issuer are checked by
//! [`TokenValidator`](crate::validator::TokenValidator) so that each failure keeps its own
//! reason and the ordering of those checks stays under the validator's control.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenClaims},
	error::TokenError,
};

/// HS256 verifier for compact JWS tokens.
pub struct TokenCodec {
	key: DecodingKey,
	validation: Validation,
}
impl TokenCodec {
	/// Creates a verifier for tokens signed with `secret`.
	pub fn hs256(secret: &Secret) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);

		validation.validate_exp = false;
		validation.validate_nbf = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		Self { key: DecodingKey::from_secret(secret.expose().as_bytes()), validation }
	}

	/// Verifies the signature and decodes the claims.
	pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
		decode::<TokenClaims>(token, &self.key, &self.validation)
			.map(|data| data.claims)
			.map_err(classify_decode_error)
	}
}
impl Debug for TokenCodec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCodec").field("algorithm", &Algorithm::HS256).finish()
	}
}

fn classify_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
	match err.kind() {
		ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
		ErrorKind::ExpiredSignature => TokenError::Expired,
		_ => TokenError::Invalid,
	}
}
