//! Startup: probe the auth service, then acquire the first token.
//!
//! Attempts probe the auth service until it answers `200`; from then on each attempt goes
//! straight to the token exchange. The first attempt that yields a token caches it and ends the
//! loop, so a healthy probe alone never ends it. Any failed attempt (unhealthy service,
//! unreachable service, unusable token response) waits the health-probe backoff before the
//! next one.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	http::{HttpRequest, RelayHttpClient},
	obs::{
		self, FlowKind, FlowOutcome, FlowSpan, LOG_SOURCE, NoopLogger, NoopTracer, RelayLogger,
		RelayTracer,
	},
	relay::{RestRelay, token::TokenExchange},
};

impl<C> RestRelay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Installs the host's logger and tracer, then probes the auth service and caches the
	/// first token.
	///
	/// Missing collaborators fall back to no-op implementations. Fails with
	/// [`Error::Initialization`] once every attempt of the retry budget has failed; the relay
	/// stays unusable in that case.
	pub async fn init(
		&mut self,
		logger: Option<Arc<dyn RelayLogger>>,
		tracer: Option<Arc<dyn RelayTracer>>,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::Startup;

		self.logger = logger.unwrap_or_else(|| Arc::new(NoopLogger));
		self.tracer = tracer.unwrap_or_else(|| Arc::new(NoopTracer));

		let span = FlowSpan::new(KIND, "init");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.run_startup()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn run_startup(&mut self) -> Result<()> {
		let attempts = self.config.retry_attempts;
		let mut healthy = false;

		for attempt in 1..=attempts {
			healthy = healthy || self.probe_health().await;

			if healthy && let Some(token) = self.acquire_startup_token().await? {
				self.cache.save(self.config.username(), token).await?;
				self.initialized = true;
				self.logger.log("Relay initialized with a fresh token.", LOG_SOURCE);

				return Ok(());
			}
			if attempt < attempts {
				obs::record_retry(FlowKind::Startup, attempt);
				tokio::time::sleep(self.config.backoff.health_probe).await;
			}
		}

		let err = Error::Initialization { attempts };

		self.logger.error(&err.to_string(), &format!("attempts={attempts}"), LOG_SOURCE);

		Err(err)
	}

	/// Runs one token exchange, returning `Ok(None)` for every retryable outcome after logging
	/// it.
	async fn acquire_startup_token(&self) -> Result<Option<TokenSecret>> {
		match self.exchange_token().await {
			Ok(TokenExchange::Issued(token)) => Ok(Some(token)),
			Ok(TokenExchange::Invalid(response)) => {
				self.logger.error(
					"Received an invalid token response.",
					&response.describe(),
					LOG_SOURCE,
				);

				Ok(None)
			},
			Err(Error::Transport(err)) => {
				self.logger.error(
					"Token request failed during startup.",
					&format!("{err:?}"),
					LOG_SOURCE,
				);

				Ok(None)
			},
			Err(err) => Err(err),
		}
	}

	async fn probe_health(&self) -> bool {
		const KIND: FlowKind = FlowKind::HealthProbe;

		let span = FlowSpan::new(KIND, "probe_health");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let request = HttpRequest::get(self.config.auth_health_url.clone());
		let healthy = match span.instrument(self.http_client.execute(request)).await {
			Ok(response) if response.status == StatusCode::OK => true,
			Ok(response) => {
				self.logger.error(
					"Auth service health check failed, retrying.",
					&response.describe(),
					LOG_SOURCE,
				);

				false
			},
			Err(err) => {
				self.logger.error(
					"Auth service health check is unreachable, retrying.",
					&format!("{err:?}"),
					LOG_SOURCE,
				);

				false
			},
		};

		obs::record_flow_outcome(
			KIND,
			if healthy { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		healthy
	}
}
