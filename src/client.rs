//! Thin clients for the identity provider's token and introspection endpoints.

pub mod credentials;
pub mod introspection;

pub use credentials::*;
pub use introspection::*;

// self
use crate::{
	_prelude::*,
	error::{ConfigError, UpstreamError},
	http::HttpReply,
};

/// Identity-provider endpoints this crate talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Client-credentials token endpoint.
	Token,
	/// Token introspection endpoint.
	Introspection,
}
impl Endpoint {
	/// Returns a stable label suitable for logs and errors.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Token => "token",
			Self::Introspection => "introspection",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

pub(crate) fn require_endpoint(url: Option<&Url>, endpoint: Endpoint) -> Result<Url, ConfigError> {
	url.cloned().ok_or(ConfigError::MissingEndpoint { endpoint })
}

pub(crate) fn check_status(reply: &HttpReply, endpoint: Endpoint) -> Result<(), UpstreamError> {
	match reply.status {
		401 => Err(UpstreamError::InvalidClient { endpoint }),
		_ if reply.is_success() => Ok(()),
		status => Err(UpstreamError::Status { endpoint, status }),
	}
}

pub(crate) fn parse_json<T>(reply: &HttpReply, endpoint: Endpoint) -> Result<T, UpstreamError>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| UpstreamError::ResponseParse { endpoint, source: Arc::new(source) })
}
