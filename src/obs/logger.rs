/// Log sink supplied by the host service.
pub trait RelayLogger
where
	Self: Send + Sync,
{
	/// Records an informational event.
	fn log(&self, message: &str, source: &str);

	/// Records a failure along with the raw error or response that caused it.
	fn error(&self, message: &str, detail: &str, source: &str);
}

/// Logger that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;
impl RelayLogger for NoopLogger {
	fn log(&self, _: &str, _: &str) {}

	fn error(&self, _: &str, _: &str, _: &str) {}
}

/// Logger that forwards events to the `tracing` dispatcher.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;
#[cfg(feature = "tracing")]
impl RelayLogger for TracingLogger {
	fn log(&self, message: &str, source: &str) {
		tracing::info!(source, "{message}");
	}

	fn error(&self, message: &str, detail: &str, source: &str) {
		tracing::error!(source, detail, "{message}");
	}
}
