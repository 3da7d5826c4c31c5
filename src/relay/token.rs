//! Token fetcher with its own bounded retry loop.

// crates.io
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::TransportError,
	http::{HttpRequest, HttpResponse, RelayHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, LOG_SOURCE},
	relay::RestRelay,
};

/// Result of a single credential exchange that reached the token endpoint.
#[derive(Debug)]
pub(crate) enum TokenExchange {
	/// The endpoint issued a usable token.
	Issued(TokenSecret),
	/// The endpoint answered without a usable token (empty body or non-success status).
	Invalid(HttpResponse),
}

impl<C> RestRelay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Fetches a fresh token, caches it, and returns it.
	///
	/// Performs up to [`RelayConfig::retry_attempts`](crate::config::RelayConfig) exchanges,
	/// waiting the token-fetch backoff between failed ones. Fails with [`Error::TokenFetch`]
	/// once the budget is spent; callers do not retry the fetch again.
	pub async fn fetch_token(&self) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::TokenFetch;

		let span = FlowSpan::new(KIND, "fetch_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let attempts = self.config.retry_attempts;

				for attempt in 1..=attempts {
					match self.exchange_token().await {
						Ok(TokenExchange::Issued(token)) => {
							self.cache.save(self.config.username(), token.clone()).await?;

							return Ok(token);
						},
						Ok(TokenExchange::Invalid(response)) => self.logger.error(
							"Received an invalid token response.",
							&response.describe(),
							LOG_SOURCE,
						),
						Err(Error::Transport(err)) => self.logger.error(
							"Token request failed.",
							&format!("{err:?}"),
							LOG_SOURCE,
						),
						Err(err) => return Err(err),
					}

					if attempt < attempts {
						obs::record_retry(KIND, attempt);
						tokio::time::sleep(self.config.backoff.token_fetch).await;
					}
				}

				let err = Error::TokenFetch { attempts };

				self.logger.error(&err.to_string(), &format!("attempts={attempts}"), LOG_SOURCE);

				Err(err)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Posts the principal's credentials to the token endpoint once.
	pub(crate) async fn exchange_token(&self) -> Result<TokenExchange> {
		let body = self.config.principal.token_request_body().map_err(TransportError::from)?;
		let request = HttpRequest::post(self.config.auth_token_url.clone(), body)
			.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		let response = self.http_client.execute(request).await?;

		if !response.status.is_success() {
			return Ok(TokenExchange::Invalid(response));
		}

		Ok(match TokenSecret::from_response_body(&response.body) {
			Some(token) => TokenExchange::Issued(token),
			None => TokenExchange::Invalid(response),
		})
	}
}
