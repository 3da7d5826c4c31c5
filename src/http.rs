//! Transport primitives for health probes, token exchanges, and payload sends.
//!
//! [`RelayHttpClient`] is the relay's only dependency on an HTTP stack. The default
//! [`ReqwestHttpClient`] owns a single keep-alive connection pool shared by every request the
//! relay issues and bounds the number of in-flight requests with a semaphore, so excess
//! concurrent sends wait for a free socket instead of failing.

// std
use std::borrow::Cow;
// crates.io
use reqwest::header::{CONTENT_TYPE, HeaderName};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`RelayHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports used by the relay.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared by
/// concurrent `relay` calls. Non-success statuses are *not* errors at this layer; the relay
/// inspects [`HttpResponse::status`] itself. Only failures that prevent a response from being
/// read (DNS, TCP, TLS, body read) are reported as [`TransportError`].
pub trait RelayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response body.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Outbound request handed to a [`RelayHttpClient`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Builds a body-less `GET`.
	pub fn get(url: Url) -> Self {
		Self { method: Method::GET, url, headers: HeaderMap::new(), body: None }
	}

	/// Builds a `POST` carrying `body`.
	pub fn post(url: Url, body: Vec<u8>) -> Self {
		Self { method: Method::POST, url, headers: HeaderMap::new(), body: Some(body) }
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Buffered response returned by a [`RelayHttpClient`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// Response status.
	pub status: StatusCode,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Lossily decodes the body for diagnostics.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Renders the status and body the way failure logs report a raw response.
	pub fn describe(&self) -> String {
		format!("status={} body={:?}", self.status.as_u16(), self.body_text())
	}
}

/// Opaque payload relayed to the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
	/// Text payload, sent with a JSON content type.
	Text(String),
	/// Raw bytes, sent without a content-type override.
	Bytes(Vec<u8>),
}
impl Payload {
	/// Content type the payload must be announced with, if any.
	pub fn content_type(&self) -> Option<HeaderValue> {
		match self {
			Self::Text(_) => Some(HeaderValue::from_static("application/json")),
			Self::Bytes(_) => None,
		}
	}

	/// Copies the payload into a request body without transforming it.
	pub fn to_body(&self) -> Vec<u8> {
		match self {
			Self::Text(text) => text.as_bytes().to_vec(),
			Self::Bytes(bytes) => bytes.clone(),
		}
	}

	/// Builds the destination `POST` for this payload.
	pub(crate) fn to_request(&self, url: Url, authorization: HeaderValue) -> HttpRequest {
		let request = HttpRequest::post(url, self.to_body())
			.header(reqwest::header::AUTHORIZATION, authorization);

		match self.content_type() {
			Some(content_type) => request.header(CONTENT_TYPE, content_type),
			None => request,
		}
	}
}
impl From<String> for Payload {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&str> for Payload {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<Vec<u8>> for Payload {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}
impl From<&[u8]> for Payload {
	fn from(value: &[u8]) -> Self {
		Self::Bytes(value.to_vec())
	}
}

/// Pooled reqwest transport shared by every request of a relay instance.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	sockets: Arc<Semaphore>,
	max_sockets: usize,
}
impl ReqwestHttpClient {
	const KEEP_ALIVE: Duration = Duration::from_secs(60);

	/// Builds a keep-alive client allowing at most `max_sockets` concurrent requests.
	pub fn pooled(max_sockets: usize) -> Result<Self, ConfigError> {
		let max_sockets = max_sockets.max(1);
		let client = ReqwestClient::builder()
			.pool_max_idle_per_host(max_sockets)
			.tcp_keepalive(Self::KEEP_ALIVE)
			.build()?;

		Ok(Self::with_client(client, max_sockets))
	}

	/// Wraps an existing reqwest [`ReqwestClient`], bounding it to `max_sockets` in-flight
	/// requests.
	pub fn with_client(client: ReqwestClient, max_sockets: usize) -> Self {
		let max_sockets = max_sockets.max(1);

		Self { client, sockets: Arc::new(Semaphore::new(max_sockets)), max_sockets }
	}

	/// Upper bound on concurrent requests.
	pub fn max_sockets(&self) -> usize {
		self.max_sockets
	}
}
impl RelayHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let _socket = self.sockets.acquire().await;
			let HttpRequest { method, url, headers, body } = request;
			let mut builder = self.client.request(method, url.clone()).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response =
				builder.send().await.map_err(|err| TransportError::network(&url, err))?;
			let status = response.status();
			let body = response.bytes().await.map_err(|err| TransportError::network(&url, err))?;

			Ok(HttpResponse { status, body: body.to_vec() })
		})
	}
}
