//! Client-credentials grant against the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	client::{self, Endpoint},
	config::AuthConfig,
	error::UpstreamError,
	http::{AuthHttpClient, FormRequest},
};

/// Successful token-endpoint response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceTokenResponse {
	/// Issued bearer token.
	pub access_token: Secret,
	/// Token type reported by the provider, usually `Bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Space-delimited scopes actually granted.
	#[serde(default)]
	pub scope: Option<String>,
}
impl ServiceTokenResponse {
	/// Returns the token lifetime, rejecting absent or non-positive values.
	pub fn expires_in(&self) -> Result<Duration, UpstreamError> {
		match self.expires_in {
			Some(secs) if secs > 0 => Ok(Duration::seconds(secs)),
			value => Err(UpstreamError::InvalidExpiresIn { value }),
		}
	}
}

/// Requests service tokens with this service's own client credentials.
pub struct ServiceCredentialsClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	config: Arc<AuthConfig>,
	http_client: Arc<C>,
}
impl<C> ServiceCredentialsClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a client sharing `config` and `http_client`.
	pub fn new(config: Arc<AuthConfig>, http_client: Arc<C>) -> Self {
		Self { config, http_client }
	}

	/// Performs one client-credentials exchange.
	///
	/// Sends `grant_type=client_credentials` and, when configured, the normalized service
	/// scopes. No retries happen here; the caller decides what a failure means.
	pub async fn fetch(&self) -> Result<ServiceTokenResponse> {
		let (client_id, client_secret) = self.config.client_credentials()?;
		let url = client::require_endpoint(self.config.token_endpoint.as_ref(), Endpoint::Token)?;
		let mut form = vec![("grant_type", "client_credentials".to_owned())];

		if !self.config.service_scopes.is_empty() {
			form.push(("scope", self.config.service_scopes.normalized()));
		}

		let request = FormRequest {
			endpoint: Endpoint::Token,
			url,
			client_id: client_id.to_owned(),
			client_secret: client_secret.clone(),
			form,
			timeout: self.config.request_timeout,
		};
		let reply = self.http_client.post_form(request).await?;

		client::check_status(&reply, Endpoint::Token)?;

		Ok(client::parse_json(&reply, Endpoint::Token)?)
	}
}
impl<C> Clone for ServiceCredentialsClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), http_client: self.http_client.clone() }
	}
}
impl<C> Debug for ServiceCredentialsClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceCredentialsClient")
			.field("token_endpoint", &self.config.token_endpoint.as_ref().map(Url::as_str))
			.finish()
	}
}
