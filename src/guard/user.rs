//! End-user guard with a local-development bypass.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedUser, ScopeSet},
	guard::{self, AUTHORIZATION_HEADER, Access, GuardRejection, GuardRequest, USER_ID_HEADER},
	http::AuthHttpClient,
	obs::{self, AuthFlow},
	validator::TokenValidator,
};

/// Placeholder identity used when no `x-user-id` header is present.
pub const LOCAL_USER_ID: &str = "local-dev-user";
/// Client id carried by synthesized identities.
pub const LOCAL_CLIENT_ID: &str = "local-dev";
/// Scopes carried by synthesized identities.
pub const LOCAL_SCOPES: &str = "read write";
/// Lifetime stamped on synthesized identities.
pub const LOCAL_LIFETIME: Duration = Duration::hours(1);

/// Authenticates end users.
///
/// When authentication is disabled the guard allows every request and attaches a permissive
/// identity taken from `x-user-id` (or [`LOCAL_USER_ID`]) with `read` and `write`
/// scopes. That path is unreachable while authentication is enabled.
pub struct UserGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	validator: Arc<TokenValidator<C>>,
}
impl<C> UserGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a guard delegating to `validator`.
	pub fn new(validator: Arc<TokenValidator<C>>) -> Self {
		Self { validator }
	}

	/// Authorizes `request`, attaching the identity on success.
	pub async fn authorize<R>(&self, request: &mut R) -> Result<Access, GuardRejection>
	where
		R: ?Sized + GuardRequest,
	{
		if !self.validator.config().enabled {
			let user = local_identity(request.header(USER_ID_HEADER));

			request.attach_identity(user.clone());

			return Ok(Access::LocalBypass(user));
		}

		let user = obs::observe(AuthFlow::UserGuard, "authorize", async {
			let token = request
				.header(AUTHORIZATION_HEADER)
				.and_then(guard::bearer_token)
				.ok_or(GuardRejection::NoToken)?;

			self.validator.validate(token).await.map_err(|_| GuardRejection::AuthenticationFailed)
		})
		.await?;

		request.attach_identity(user.clone());

		Ok(Access::Authenticated(user))
	}
}
impl<C> Clone for UserGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn clone(&self) -> Self {
		Self { validator: self.validator.clone() }
	}
}
impl<C> Debug for UserGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserGuard").field("validator", &self.validator).finish()
	}
}

fn local_identity(requested: Option<&str>) -> AuthenticatedUser {
	let id = requested
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.unwrap_or(LOCAL_USER_ID)
		.to_owned();
	let expires_at = (OffsetDateTime::now_utc() + LOCAL_LIFETIME).unix_timestamp();

	AuthenticatedUser {
		subject: id.clone(),
		id,
		client_id: LOCAL_CLIENT_ID.to_owned(),
		scopes: ScopeSet::from_delimited(LOCAL_SCOPES),
		expires_at,
	}
}
