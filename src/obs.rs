//! Optional observability helpers for validation, guard, and service-token flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `mealplan_auth.flow` with the `flow` and
//!   `stage` fields, plus debug events describing rejected tokens.
//! - Enable `metrics` to increment `mealplan_auth_flow_total` (labels `flow`, `outcome`) and
//!   `mealplan_auth_cache_total` (labels `cache`, `event`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthFlow {
	/// Local HS256 verification.
	LocalValidation,
	/// Remote introspection, including cache lookups.
	Introspection,
	/// Outbound service-token acquisition.
	ServiceToken,
	/// End-user request guard.
	UserGuard,
	/// Service-to-service request guard.
	ServiceGuard,
}
impl AuthFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthFlow::LocalValidation => "local_validation",
			AuthFlow::Introspection => "introspection",
			AuthFlow::ServiceToken => "service_token",
			AuthFlow::UserGuard => "user_guard",
			AuthFlow::ServiceGuard => "service_guard",
		}
	}
}
impl Display for AuthFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// In-process caches whose activity is counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
	/// Introspection response cache.
	Introspection,
	/// Outbound service-token cache.
	ServiceToken,
}
impl CacheKind {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheKind::Introspection => "introspection",
			CacheKind::ServiceToken => "service_token",
		}
	}
}

/// Cache activity labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheEvent {
	/// A fresh entry was reused.
	Hit,
	/// No fresh entry was available.
	Miss,
	/// A new entry was stored.
	Store,
	/// Entries were dropped by a sweep or an explicit clear.
	Evict,
}
impl CacheEvent {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheEvent::Hit => "hit",
			CacheEvent::Miss => "miss",
			CacheEvent::Store => "store",
			CacheEvent::Evict => "evict",
		}
	}
}

/// Runs `fut` inside a flow span and records attempt plus success or failure.
pub(crate) async fn observe<T, E, Fut>(flow: AuthFlow, stage: &'static str, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let span = FlowSpan::new(flow, stage);

	record_flow_outcome(flow, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(flow, FlowOutcome::Success),
		Err(e) => {
			trace_failure(flow, e);
			record_flow_outcome(flow, FlowOutcome::Failure);
		},
	}

	result
}
