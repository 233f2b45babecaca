// self
use crate::{_prelude::*, obs::AuthFlow};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by validation, guard, and service-token flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow + stage.
	pub fn new(flow: AuthFlow, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("mealplan_auth.flow", flow = flow.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (flow, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event carrying the precise failure reason.
///
/// Guards only surface coarse messages, so this is where the specific cause stays visible to
/// operators.
pub fn trace_failure(flow: AuthFlow, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = flow.as_str(), reason = %reason, "auth flow failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (flow, reason);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn trace_failure_accepts_any_display() {
		trace_failure(AuthFlow::UserGuard, &"No token provided");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(AuthFlow::Introspection, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
