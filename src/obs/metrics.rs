// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rest_relay_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records that a retry loop failed `attempt` and is backing off before the next one.
///
/// Emits `rest_relay_retry_total{flow,attempt}`; `attempt` is bounded by the configured retry
/// budget, so the label set stays small.
pub fn record_retry(kind: FlowKind, attempt: u32) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rest_relay_retry_total",
			"flow" => kind.as_str(),
			"attempt" => attempt.to_string()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, attempt);
	}
}
