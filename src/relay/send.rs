//! Payload delivery with one-shot recovery from rejected tokens.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::TransportError,
	http::{HttpResponse, Payload, RelayHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, LOG_SOURCE},
	relay::RestRelay,
};

impl<C> RestRelay<C>
where
	C: ?Sized + RelayHttpClient,
{
	/// Posts `payload` to the destination with `token`.
	///
	/// A `401` answer triggers exactly one [`RestRelay::fetch_token`] followed by one retry with
	/// the new token; the retry's outcome is final. Any final status outside `2xx` fails with
	/// [`Error::Rejected`]. Every failure is logged before it is returned.
	pub async fn send_data(&self, token: &TokenSecret, payload: &Payload) -> Result<()> {
		const KIND: FlowKind = FlowKind::Send;

		let span = FlowSpan::new(KIND, "send_data");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.post_payload(token, payload).await?;

				if response.status != StatusCode::UNAUTHORIZED {
					return ensure_accepted(response);
				}

				self.logger.log(
					"Destination rejected the token, fetching a new one and retrying once.",
					LOG_SOURCE,
				);

				let token = self.fetch_token().await?;
				let response = self.post_payload(&token, payload).await?;

				ensure_accepted(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				self.logger.error("Failed to send payload.", &format!("{err:?}"), LOG_SOURCE);
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn post_payload(&self, token: &TokenSecret, payload: &Payload) -> Result<HttpResponse> {
		let request = payload.to_request(self.config.destination_url.clone(), bearer(token)?);

		Ok(self.http_client.execute(request).await?)
	}
}

fn bearer(token: &TokenSecret) -> Result<HeaderValue, TransportError> {
	let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))?;

	value.set_sensitive(true);

	Ok(value)
}

fn ensure_accepted(response: HttpResponse) -> Result<()> {
	if response.status.is_success() {
		Ok(())
	} else {
		Err(Error::Rejected {
			status: response.status.as_u16(),
			body: response.body_text().into_owned(),
		})
	}
}
