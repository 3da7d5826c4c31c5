//! Observability for relay flows.
//!
//! Host-facing hooks are the [`RelayLogger`] and [`RelayTracer`] capability traits. Both have
//! no-op defaults ([`NoopLogger`], [`NoopTracer`]) so relay logic never branches on whether a
//! host supplied them.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `rest_relay.flow` with the `flow` and
//!   `stage` (call site) fields, and to get [`TracingLogger`].
//! - Enable `metrics` to increment the `rest_relay_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the `rest_relay_retry_total`
//!   counter for every backoff of a retry loop, labeled by `flow` + `attempt`.

mod logger;
mod metrics;
mod tracer;
mod tracing;

pub use logger::*;
pub use metrics::*;
pub use tracer::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Source tag attached to every log entry the relay emits.
pub const LOG_SOURCE: &str = "rest-relay";
/// Name of the transaction opened by each `relay` call.
pub const RELAY_TRANSACTION: &str = "rest-relay.relay";
/// Name of the span scoped to the send inside a `relay` call.
pub const SEND_SPAN: &str = "rest-relay.send";

/// Relay flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Startup loop run by `init`.
	Startup,
	/// Startup health probe against the auth service.
	HealthProbe,
	/// Credential exchange at the token endpoint.
	TokenFetch,
	/// Payload delivery to the destination.
	Send,
	/// Public `relay` entry point.
	Relay,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Startup => "startup",
			FlowKind::HealthProbe => "health_probe",
			FlowKind::TokenFetch => "token_fetch",
			FlowKind::Send => "send",
			FlowKind::Relay => "relay",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a relay helper.
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
