//! Token introspection (RFC 7662) against the identity provider.

// self
use crate::{
	_prelude::*,
	auth::IntrospectionResult,
	client::{self, Endpoint},
	config::AuthConfig,
	http::{AuthHttpClient, FormRequest},
};

/// Asks the identity provider whether a token is active.
pub struct IntrospectionClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	config: Arc<AuthConfig>,
	http_client: Arc<C>,
}
impl<C> IntrospectionClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a client sharing `config` and `http_client`.
	pub fn new(config: Arc<AuthConfig>, http_client: Arc<C>) -> Self {
		Self { config, http_client }
	}

	/// Introspects `token`, authenticating with this service's client credentials.
	///
	/// Any non-success status, transport failure, or malformed body is an error; an inactive
	/// token is a successful call whose result has `active == false`.
	pub async fn introspect(&self, token: &str) -> Result<IntrospectionResult> {
		let (client_id, client_secret) = self.config.client_credentials()?;
		let url = client::require_endpoint(
			self.config.introspection_endpoint.as_ref(),
			Endpoint::Introspection,
		)?;
		let request = FormRequest {
			endpoint: Endpoint::Introspection,
			url,
			client_id: client_id.to_owned(),
			client_secret: client_secret.clone(),
			form: vec![
				("token", token.to_owned()),
				("token_type_hint", "access_token".to_owned()),
			],
			timeout: self.config.request_timeout,
		};
		let reply = self.http_client.post_form(request).await?;

		client::check_status(&reply, Endpoint::Introspection)?;

		Ok(client::parse_json(&reply, Endpoint::Introspection)?)
	}
}
impl<C> Clone for IntrospectionClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), http_client: self.http_client.clone() }
	}
}
impl<C> Debug for IntrospectionClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IntrospectionClient")
			.field("endpoint", &self.config.introspection_endpoint.as_ref().map(Url::as_str))
			.finish()
	}
}
