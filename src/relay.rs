//! Relay plugin composed of the startup lifecycle, token fetcher, and sender.

mod lifecycle;
mod send;
mod token;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::{MemoryTokenCache, TokenCache},
	config::RelayConfig,
	http::{Payload, RelayHttpClient, ReqwestHttpClient},
	obs::{
		self, FlowKind, FlowOutcome, FlowSpan, LOG_SOURCE, NoopLogger, NoopTracer,
		RELAY_TRANSACTION, RelayLogger, RelayTracer, SEND_SPAN, ScopeGuard,
	},
};

/// Relay specialized for the crate's default reqwest transport.
pub type ReqwestRelay = RestRelay<ReqwestHttpClient>;

/// Transport plugin that relays payloads to a REST destination with bearer-token auth.
///
/// The relay owns the connection pool, the token cache, and the host's logger + tracer. Call
/// [`RestRelay::init`] once before [`RestRelay::relay`]; after that the relay can be shared
/// behind an [`Arc`] and `relay` may be called concurrently.
pub struct RestRelay<C = ReqwestHttpClient>
where
	C: ?Sized + RelayHttpClient,
{
	/// HTTP client shared by every probe, token exchange, and send.
	pub http_client: Arc<C>,
	/// Token cache keyed by principal username.
	pub cache: Arc<dyn TokenCache>,
	/// Immutable relay settings.
	pub config: RelayConfig,
	logger: Arc<dyn RelayLogger>,
	tracer: Arc<dyn RelayTracer>,
	initialized: bool,
}
impl<C> RestRelay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(config: RelayConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		config.validate()?;

		Ok(Self {
			http_client: http_client.into(),
			cache: Arc::new(MemoryTokenCache::default()),
			config,
			logger: Arc::new(NoopLogger),
			tracer: Arc::new(NoopTracer),
			initialized: false,
		})
	}

	/// Replaces the token cache, e.g. with one whose expiry the host manages.
	pub fn with_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Returns `true` once [`RestRelay::init`] has succeeded.
	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	/// Reads the token currently cached for the configured principal.
	pub async fn cached_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.cache.fetch(self.config.username()).await?)
	}

	/// Relays one payload to the destination.
	///
	/// Uses the cached token, fetching one first on a cache miss. A `401` from the destination
	/// triggers one re-authentication and retry inside [`RestRelay::send_data`]. Each call opens
	/// one tracer transaction plus a nested send span and ends both exactly once.
	pub async fn relay(&self, payload: impl Into<Payload>) -> Result<()> {
		const KIND: FlowKind = FlowKind::Relay;

		let payload = payload.into();
		let span = FlowSpan::new(KIND, "relay");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if !self.initialized {
					return Err(Error::NotInitialized);
				}

				let transaction = ScopeGuard::new(self.tracer.start_transaction(RELAY_TRANSACTION));
				let token = match self.cache.fetch(self.config.username()).await? {
					Some(token) => token,
					None => self.fetch_token().await?,
				};
				let send_span = ScopeGuard::new(self.tracer.start_span(SEND_SPAN));
				let sent = self.send_data(&token, &payload).await;

				send_span.end();

				if let Err(err) = &sent {
					self.logger.error("Failed to relay payload.", &format!("{err:?}"), LOG_SOURCE);
				}

				transaction.end();

				sent
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
impl RestRelay<ReqwestHttpClient> {
	/// Creates a relay backed by a pooled reqwest client sized from
	/// [`RelayConfig::max_sockets`].
	pub fn new(config: RelayConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::pooled(config.max_sockets)?;

		Self::with_http_client(config, http_client)
	}
}
impl<C> Debug for RestRelay<C>
where
	C: ?Sized + RelayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RestRelay")
			.field("config", &self.config)
			.field("initialized", &self.initialized)
			.finish()
	}
}
