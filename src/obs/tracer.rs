// self
use crate::_prelude::*;

/// Handle for an open transaction or span.
pub trait TraceScope
where
	Self: Send,
{
	/// Closes the scope.
	fn end(self: Box<Self>);
}

/// Tracing backend supplied by the host service.
pub trait RelayTracer
where
	Self: Send + Sync,
{
	/// Opens a top-level transaction.
	fn start_transaction(&self, name: &str) -> Box<dyn TraceScope>;

	/// Opens a span nested in the current transaction.
	fn start_span(&self, name: &str) -> Box<dyn TraceScope>;
}

/// Tracer whose scopes do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;
impl RelayTracer for NoopTracer {
	fn start_transaction(&self, _: &str) -> Box<dyn TraceScope> {
		Box::new(NoopScope)
	}

	fn start_span(&self, _: &str) -> Box<dyn TraceScope> {
		Box::new(NoopScope)
	}
}

struct NoopScope;
impl TraceScope for NoopScope {
	fn end(self: Box<Self>) {}
}

/// Ends the wrapped scope exactly once, either through [`ScopeGuard::end`] or on drop.
pub struct ScopeGuard(Option<Box<dyn TraceScope>>);
impl ScopeGuard {
	/// Takes ownership of an open scope.
	pub fn new(scope: Box<dyn TraceScope>) -> Self {
		Self(Some(scope))
	}

	/// Ends the scope now.
	pub fn end(mut self) {
		self.close();
	}

	fn close(&mut self) {
		if let Some(scope) = self.0.take() {
			scope.end();
		}
	}
}
impl Debug for ScopeGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeGuard").field(&self.0.is_some()).finish()
	}
}
impl Drop for ScopeGuard {
	fn drop(&mut self) {
		self.close();
	}
}
