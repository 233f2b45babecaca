// self
use crate::obs::{AuthFlow, CacheEvent, CacheKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(flow: AuthFlow, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mealplan_auth_flow_total",
			"flow" => flow.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (flow, outcome);
	}
}

/// Records cache activity via the global metrics recorder (when enabled).
pub fn record_cache_event(cache: CacheKind, event: CacheEvent, count: u64) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mealplan_auth_cache_total",
			"cache" => cache.as_str(),
			"event" => event.as_str()
		)
		.increment(count);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (cache, event, count);
	}
}
