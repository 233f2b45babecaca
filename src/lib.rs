//! Bearer-token validation, introspection caching, and single-flight service tokens for the
//! meal-plan API.
//!
//! The crate pairs a [`validator::TokenValidator`] (local HS256 verification or remote
//! introspection with a TTL cache) with a [`service_token::ServiceTokenProvider`] that keeps one
//! client-credentials token per process and never lets concurrent callers stampede the token
//! endpoint. Request-time policies live in [`guard`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod obs;
pub mod service_token;
pub mod validator;

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
