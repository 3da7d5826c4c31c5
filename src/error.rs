//! Relay-level error types shared across the lifecycle, token, and send paths.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, request construction).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Startup could not obtain a usable token within the retry budget.
	#[error("Unable to fetch a valid token.")]
	Initialization {
		/// Number of attempts performed before giving up.
		attempts: u32,
	},
	/// A standalone token fetch exhausted its retry budget.
	#[error("Failed to fetch token after multiple attempts.")]
	TokenFetch {
		/// Number of attempts performed before giving up.
		attempts: u32,
	},
	/// Destination answered the final send with a non-success status.
	#[error("Destination rejected the payload with status {status}.")]
	Rejected {
		/// HTTP status code returned by the destination.
		status: u16,
		/// Raw response body, lossily decoded.
		body: String,
	},
	/// `relay` was called before `init` completed successfully.
	#[error("Relay has not been initialized.")]
	NotInitialized,
}

/// Configuration and validation failures raised while building the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configuration document could not be deserialized.
	#[error("Configuration is malformed at `{path}`.")]
	Malformed {
		/// Path of the offending field inside the document.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// A required field was not supplied to the builder.
	#[error("Configuration is missing `{field}`.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// An endpoint URL cannot be parsed.
	#[error("The {endpoint} URL is invalid.")]
	InvalidUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint URL uses a scheme other than HTTP(S).
	#[error("The {endpoint} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Retry budget must allow at least one attempt.
	#[error("The retry attempt budget must be at least 1.")]
	ZeroRetryAttempts,
	/// Connection pool must allow at least one socket.
	#[error("The maximum socket count must be at least 1.")]
	ZeroMaxSockets,
	/// Principal username failed validation.
	#[error(transparent)]
	InvalidUsername(#[from] crate::auth::UsernameError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Malformed { path, source: e.into_inner() }
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Endpoint being called.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// A header value could not be encoded (e.g. a token with control characters).
	#[error("Request header value is invalid.")]
	InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `url`.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}
