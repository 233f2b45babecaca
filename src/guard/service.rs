//! Service-to-service guard.

// self
use crate::{
	_prelude::*,
	guard::{self, AUTHORIZATION_HEADER, Access, GuardRejection, GuardRequest},
	http::AuthHttpClient,
	obs::{self, AuthFlow},
	validator::TokenValidator,
};

/// Scopes of which a calling service must hold at least one.
pub const SERVICE_BASELINE_SCOPES: [&str; 2] = ["read", "write"];

/// Authenticates calls made by other internal services.
///
/// Disabled (either the whole subsystem or service-to-service specifically) means every request
/// passes without an identity. Enabled, the guard requires `Bearer <token>`, validates it, and
/// demands one of [`SERVICE_BASELINE_SCOPES`].
pub struct ServiceGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	validator: Arc<TokenValidator<C>>,
}
impl<C> ServiceGuard<C>
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
		if !self.validator.config().service_to_service_active() {
			return Ok(Access::Open);
		}

		let user = obs::observe(AuthFlow::ServiceGuard, "authorize", async {
			// The header shape is checked before any validation work.
			let token = request
				.header(AUTHORIZATION_HEADER)
				.and_then(guard::bearer_token)
				.ok_or(GuardRejection::InvalidHeader)?;
			let user = self
				.validator
				.validate(token)
				.await
				.map_err(|_| GuardRejection::ServiceAuthenticationFailed)?;

			if !user.has_any_scope(SERVICE_BASELINE_SCOPES) {
				return Err(GuardRejection::InsufficientPermissions);
			}

			Ok(user)
		})
		.await?;

		request.attach_identity(user.clone());

		Ok(Access::Authenticated(user))
	}
}
impl<C> Clone for ServiceGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn clone(&self) -> Self {
		Self { validator: self.validator.clone() }
	}
}
impl<C> Debug for ServiceGuard<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceGuard").field("validator", &self.validator).finish()
	}
}
