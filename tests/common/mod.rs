//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, Instant},
};
// crates.io
use parking_lot::Mutex;
// self
use rest_relay::{
	auth::{TokenSecret, Username},
	cache::{CacheFuture, TokenCache},
	config::{BackoffPolicy, RelayConfig},
	error::TransportError,
	http::{HttpFuture, HttpRequest, HttpResponse, RelayHttpClient, ReqwestHttpClient},
	obs::{RelayLogger, RelayTracer, TraceScope},
	relay::RestRelay,
	reqwest::{Client as ReqwestClient, Method, StatusCode, header::HeaderMap},
};

pub const HEALTH_PATH: &str = "/health";
pub const TOKEN_PATH: &str = "/token";
pub const DESTINATION_PATH: &str = "/ingest";
pub const USERNAME: &str = "relay-svc";
pub const PASSWORD: &str = "s3cret";
pub const HEALTH_BACKOFF: Duration = Duration::from_millis(40);
pub const TOKEN_BACKOFF: Duration = Duration::from_millis(60);

/// Config pointing at the scripted hosts with short backoffs.
pub fn scripted_config(retry_attempts: u32) -> RelayConfig {
	config_for("http://auth.test", "http://sink.test", retry_attempts)
}

/// Config pointing at `auth_base` / `sink_base` with short backoffs.
pub fn config_for(auth_base: &str, sink_base: &str, retry_attempts: u32) -> RelayConfig {
	RelayConfig::builder()
		.auth_health_url(format!("{auth_base}{HEALTH_PATH}"))
		.auth_token_url(format!("{auth_base}{TOKEN_PATH}"))
		.destination_url(format!("{sink_base}{DESTINATION_PATH}"))
		.credentials(USERNAME, PASSWORD)
		.retry_attempts(retry_attempts)
		.max_sockets(4)
		.backoff(BackoffPolicy { health_probe: HEALTH_BACKOFF, token_fetch: TOKEN_BACKOFF })
		.build()
		.expect("Test configuration should validate.")
}

/// Builds a reqwest-backed relay that accepts the self-signed certificates produced by
/// `httpmock`.
pub fn mock_server_relay(config: RelayConfig) -> RestRelay<ReqwestHttpClient> {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");
	let http_client = ReqwestHttpClient::with_client(client, config.max_sockets);

	RestRelay::with_http_client(config, http_client)
		.expect("Relay should build from a valid configuration.")
}

/// Scripted response for a [`ScriptedHttpClient`] route.
#[derive(Clone, Debug)]
pub enum Reply {
	/// Respond with a status and body.
	Status(u16, &'static str),
	/// Fail before a response is read.
	Unreachable,
}
impl Reply {
	pub fn ok(body: &'static str) -> Self {
		Self::Status(200, body)
	}
}

/// Request observed by a [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
	pub method: Method,
	pub path: String,
	pub headers: HeaderMap,
	pub body: Option<Vec<u8>>,
	pub at: Instant,
}
impl RecordedCall {
	pub fn header(&self, name: &str) -> Option<String> {
		self.headers.get(name).map(|value| {
			value.to_str().expect("Recorded header should be ASCII.").to_owned()
		})
	}
}

/// Transport that replays per-path scripts; the last reply of a script repeats forever.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
	routes: Mutex<HashMap<String, VecDeque<Reply>>>,
	calls: Mutex<Vec<RecordedCall>>,
}
impl ScriptedHttpClient {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn script(&self, path: &str, replies: impl IntoIterator<Item = Reply>) {
		self.routes.lock().insert(path.to_owned(), replies.into_iter().collect());
	}

	pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
		self.calls.lock().iter().filter(|call| call.path == path).cloned().collect()
	}

	pub fn count(&self, path: &str) -> usize {
		self.calls_to(path).len()
	}

	fn next_reply(&self, path: &str) -> Reply {
		let mut routes = self.routes.lock();

		match routes.get_mut(path) {
			Some(queue) if queue.len() > 1 => queue.pop_front().expect("Queue is non-empty."),
			Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404, "")),
			None => Reply::Status(404, ""),
		}
	}
}
impl RelayHttpClient for ScriptedHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let path = request.url.path().to_owned();

		self.calls.lock().push(RecordedCall {
			method: request.method.clone(),
			path: path.clone(),
			headers: request.headers.clone(),
			body: request.body.clone(),
			at: Instant::now(),
		});

		let reply = self.next_reply(&path);

		Box::pin(async move {
			match reply {
				Reply::Status(code, body) => Ok(HttpResponse::new(
					StatusCode::from_u16(code).expect("Scripted status should be valid."),
					body,
				)),
				Reply::Unreachable => Err(TransportError::network(
					&request.url,
					io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
				)),
			}
		})
	}
}

/// Token cache that tests can clear to force a miss.
#[derive(Debug, Default)]
pub struct ClearableCache(Mutex<HashMap<String, TokenSecret>>);
impl ClearableCache {
	pub fn clear(&self) {
		self.0.lock().clear();
	}

	pub fn get(&self) -> Option<String> {
		self.0.lock().get(USERNAME).map(|token| token.expose().to_owned())
	}

	pub fn put(&self, token: &str) {
		self.0.lock().insert(USERNAME.to_owned(), TokenSecret::new(token));
	}
}
impl TokenCache for ClearableCache {
	fn fetch<'a>(&'a self, username: &'a Username) -> CacheFuture<'a, Option<TokenSecret>> {
		let token = self.0.lock().get(&**username).cloned();

		Box::pin(async move { Ok(token) })
	}

	fn save<'a>(&'a self, username: &'a Username, token: TokenSecret) -> CacheFuture<'a, ()> {
		self.0.lock().insert(username.to_string(), token);

		Box::pin(async { Ok(()) })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
	Info,
	Error,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
	pub level: Level,
	pub message: String,
	pub detail: Option<String>,
	pub source: String,
}

/// Logger that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger(Mutex<Vec<LogEntry>>);
impl RecordingLogger {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn entries(&self) -> Vec<LogEntry> {
		self.0.lock().clone()
	}

	pub fn errors(&self) -> Vec<LogEntry> {
		self.entries().into_iter().filter(|entry| entry.level == Level::Error).collect()
	}

	pub fn contains(&self, message: &str) -> bool {
		self.entries().iter().any(|entry| entry.message == message)
	}
}
impl RelayLogger for RecordingLogger {
	fn log(&self, message: &str, source: &str) {
		self.0.lock().push(LogEntry {
			level: Level::Info,
			message: message.to_owned(),
			detail: None,
			source: source.to_owned(),
		});
	}

	fn error(&self, message: &str, detail: &str, source: &str) {
		self.0.lock().push(LogEntry {
			level: Level::Error,
			message: message.to_owned(),
			detail: Some(detail.to_owned()),
			source: source.to_owned(),
		});
	}
}

#[derive(Debug, Default)]
pub struct TraceCounters {
	pub transactions_started: AtomicUsize,
	pub transactions_ended: AtomicUsize,
	pub spans_started: AtomicUsize,
	pub spans_ended: AtomicUsize,
}
impl TraceCounters {
	pub fn transactions(&self) -> (usize, usize) {
		(
			self.transactions_started.load(Ordering::SeqCst),
			self.transactions_ended.load(Ordering::SeqCst),
		)
	}

	pub fn spans(&self) -> (usize, usize) {
		(self.spans_started.load(Ordering::SeqCst), self.spans_ended.load(Ordering::SeqCst))
	}
}

/// Tracer that counts opened and ended scopes.
#[derive(Debug, Default)]
pub struct CountingTracer(pub Arc<TraceCounters>);
impl CountingTracer {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}
}
impl RelayTracer for CountingTracer {
	fn start_transaction(&self, _: &str) -> Box<dyn TraceScope> {
		self.0.transactions_started.fetch_add(1, Ordering::SeqCst);

		Box::new(CountingScope { counters: self.0.clone(), span: false })
	}

	fn start_span(&self, _: &str) -> Box<dyn TraceScope> {
		self.0.spans_started.fetch_add(1, Ordering::SeqCst);

		Box::new(CountingScope { counters: self.0.clone(), span: true })
	}
}

struct CountingScope {
	counters: Arc<TraceCounters>,
	span: bool,
}
impl TraceScope for CountingScope {
	fn end(self: Box<Self>) {
		let counter = if self.span {
			&self.counters.spans_ended
		} else {
			&self.counters.transactions_ended
		};

		counter.fetch_add(1, Ordering::SeqCst);
	}
}

pub fn logger_hook(logger: &Arc<RecordingLogger>) -> Option<Arc<dyn RelayLogger>> {
	Some(logger.clone() as Arc<dyn RelayLogger>)
}

pub fn tracer_hook(tracer: &Arc<CountingTracer>) -> Option<Arc<dyn RelayTracer>> {
	Some(tracer.clone() as Arc<dyn RelayTracer>)
}
