//! Identity-domain models: scopes, secrets, token claims, introspection payloads, and the
//! authenticated user handed to downstream handlers.

pub mod claims;
pub mod introspection;
pub mod scope;
pub mod secret;
pub mod user;

pub use claims::*;
pub use introspection::*;
pub use scope::*;
pub use secret::*;
pub use user::*;
