//! Transport seam for the two identity-provider calls (token and introspection).
//!
//! Both calls are form-encoded POSTs authenticated with HTTP Basic client credentials, so the
//! crate only needs one primitive from an HTTP stack: [`AuthHttpClient::post_form`]. The
//! default implementation wraps reqwest; tests and embedders can supply their own.

// self
use crate::{_prelude::*, auth::Secret, client::Endpoint, error::TransportError};

/// Boxed future returned by [`AuthHttpClient::post_form`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpReply, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of sending authenticated form posts.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by the
/// validator and the service-token provider behind `Arc`. Non-success statuses are not errors
/// at this layer; they come back as an [`HttpReply`] and are classified by the caller.
pub trait AuthHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves to the raw reply.
	fn post_form(&self, request: FormRequest) -> HttpFuture<'_>;
}

/// A form-encoded POST carrying HTTP Basic client credentials.
#[derive(Clone)]
pub struct FormRequest {
	/// Logical endpoint, used for error reporting.
	pub endpoint: Endpoint,
	/// Absolute URL to post to.
	pub url: Url,
	/// Basic-auth user name.
	pub client_id: String,
	/// Basic-auth password.
	pub client_secret: Secret,
	/// Form fields, in order.
	pub form: Vec<(&'static str, String)>,
	/// Upper bound for the whole exchange.
	pub timeout: Duration,
}
impl Debug for FormRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let fields = self.form.iter().map(|(name, _)| *name).collect::<Vec<_>>();

		f.debug_struct("FormRequest")
			.field("endpoint", &self.endpoint)
			.field("url", &self.url.as_str())
			.field("client_id", &self.client_id)
			.field("form_fields", &fields)
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Status and body of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Identity-provider endpoints answer directly, so a custom [`ReqwestClient`] should be built
/// with redirect following disabled.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn without_redirects() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AuthHttpClient for ReqwestHttpClient {
	fn post_form(&self, request: FormRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let endpoint = request.endpoint;
			let classify = |e: ReqwestError| {
				if e.is_timeout() {
					TransportError::Timeout { endpoint }
				} else {
					TransportError::network(endpoint, e)
				}
			};
			let response = self
				.0
				.post(request.url)
				.basic_auth(&request.client_id, Some(request.client_secret.expose()))
				.form(&request.form)
				.timeout(request.timeout.unsigned_abs())
				.send()
				.await
				.map_err(classify)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(classify)?.to_vec();

			Ok(HttpReply { status, body })
		})
	}
}
