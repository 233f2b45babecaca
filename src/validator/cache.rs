//! Process-local cache of introspection responses.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::IntrospectionResult};

/// Fingerprint of a bearer token used as the cache key.
///
/// The raw token never becomes a map key; the key is the SHA-256 digest of the whole token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);
impl CacheKey {
	/// Derives the key for `token`.
	pub fn derive(token: &str) -> Self {
		let digest = Sha256::digest(token.as_bytes());

		Self(STANDARD_NO_PAD.encode(digest))
	}

	/// Returns the encoded fingerprint.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CacheKey").field(&self.0.get(..8).unwrap_or(self.0.as_str())).finish()
	}
}

/// A cached introspection response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedIntrospection {
	/// Response as returned by the identity provider, active or not.
	pub result: IntrospectionResult,
	/// Instant after which the entry must not be reused.
	pub expires_at: OffsetDateTime,
}
impl CachedIntrospection {
	/// Returns `true` while `now` precedes the entry's expiry.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}
}

/// Keyed store of [`CachedIntrospection`] entries.
///
/// Expired entries are ignored on lookup and only dropped by [`purge_expired_at`]
/// (or overwritten by a newer response).
///
/// [`purge_expired_at`]: IntrospectionCache::purge_expired_at
#[derive(Debug, Default)]
pub struct IntrospectionCache {
	entries: RwLock<HashMap<CacheKey, CachedIntrospection>>,
}
impl IntrospectionCache {
	/// Returns the cached response for `key` if it is still fresh at `now`.
	pub fn get_fresh_at(&self, key: &CacheKey, now: OffsetDateTime) -> Option<IntrospectionResult> {
		self.entries
			.read()
			.get(key)
			.filter(|entry| entry.is_fresh_at(now))
			.map(|entry| entry.result.clone())
	}

	/// Stores `result` under `key`, replacing any previous entry.
	pub fn insert(&self, key: CacheKey, result: IntrospectionResult, expires_at: OffsetDateTime) {
		self.entries.write().insert(key, CachedIntrospection { result, expires_at });
	}

	/// Drops every entry that is no longer fresh at `now` and returns how many were removed.
	pub fn purge_expired_at(&self, now: OffsetDateTime) -> usize {
		let mut entries = self.entries.write();
		let before = entries.len();

		entries.retain(|_, entry| entry.is_fresh_at(now));

		before - entries.len()
	}

	/// Drops every entry and returns how many were removed.
	pub fn clear(&self) -> usize {
		let mut entries = self.entries.write();
		let removed = entries.len();

		entries.clear();

		removed
	}

	/// Number of stored entries, fresh or not.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
