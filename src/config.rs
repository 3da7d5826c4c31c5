//! Immutable relay configuration and its builder.
//!
//! Hosts either assemble a [`RelayConfig`] through [`RelayConfigBuilder`] or deserialize it from
//! a JSON document with [`RelayConfig::from_json_str`]. Both paths run the same validation, so
//! every [`RelayConfig`] handed to the relay carries a positive retry budget, a positive socket
//! bound, HTTP(S) endpoints, and a well-formed username.

// self
use crate::{
	_prelude::*,
	auth::{PasswordSecret, Principal, Username},
	error::ConfigError,
};

/// Default number of attempts for both retry loops.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default upper bound on concurrent pooled sockets.
pub const DEFAULT_MAX_SOCKETS: usize = 10;

/// Fixed delays applied between failed attempts of the two retry loops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
	/// Delay between failed startup attempts (health probe + token acquisition).
	#[serde(rename = "health_probe_ms", with = "duration_ms")]
	pub health_probe: Duration,
	/// Delay between failed token fetch attempts.
	#[serde(rename = "token_fetch_ms", with = "duration_ms")]
	pub token_fetch: Duration,
}
impl BackoffPolicy {
	/// Startup backoff used when none is configured.
	pub const DEFAULT_HEALTH_PROBE: Duration = Duration::from_millis(500);
	/// Token fetch backoff used when none is configured.
	pub const DEFAULT_TOKEN_FETCH: Duration = Duration::from_millis(5_000);
}
impl Default for BackoffPolicy {
	fn default() -> Self {
		Self { health_probe: Self::DEFAULT_HEALTH_PROBE, token_fetch: Self::DEFAULT_TOKEN_FETCH }
	}
}

/// Validated settings consumed by [`RestRelay`](crate::relay::RestRelay).
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RelayConfigDocument")]
pub struct RelayConfig {
	/// Attempt budget shared by the startup loop and every token fetch.
	pub retry_attempts: u32,
	/// Maximum number of sockets the connection pool may hold concurrently.
	pub max_sockets: usize,
	/// Endpoint probed with `GET` before the relay becomes usable.
	pub auth_health_url: Url,
	/// Endpoint that exchanges credentials for a bearer token.
	pub auth_token_url: Url,
	/// Endpoint that receives relayed payloads.
	pub destination_url: Url,
	/// Credentials presented to the token endpoint.
	pub principal: Principal,
	/// Delays between failed attempts.
	pub backoff: BackoffPolicy,
}
impl RelayConfig {
	/// Starts a builder with default retry, socket, and backoff settings.
	pub fn builder() -> RelayConfigBuilder {
		RelayConfigBuilder::default()
	}

	/// Parses and validates a JSON configuration document.
	///
	/// Field names accept both `snake_case` and the upper-case environment names
	/// (`RETRY_ATTEMPTS`, `DESTINATION_TRANSPORT_URL`, ...).
	pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(document);
		let document: RelayConfigDocument = serde_path_to_error::deserialize(de)?;

		Self::try_from(document)
	}

	/// Principal username, also used as the token cache key.
	pub fn username(&self) -> &Username {
		&self.principal.username
	}

	/// Re-checks the invariants established at construction.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.retry_attempts == 0 {
			return Err(ConfigError::ZeroRetryAttempts);
		}
		if self.max_sockets == 0 {
			return Err(ConfigError::ZeroMaxSockets);
		}

		validate_scheme("auth health", &self.auth_health_url)?;
		validate_scheme("auth token", &self.auth_token_url)?;
		validate_scheme("destination", &self.destination_url)?;

		Ok(())
	}
}

/// Builder for [`RelayConfig`] values.
#[derive(Debug)]
pub struct RelayConfigBuilder {
	retry_attempts: u32,
	max_sockets: usize,
	auth_health_url: Option<String>,
	auth_token_url: Option<String>,
	destination_url: Option<String>,
	username: Option<String>,
	password: Option<String>,
	backoff: BackoffPolicy,
}
impl RelayConfigBuilder {
	/// Overrides the retry attempt budget.
	pub fn retry_attempts(mut self, attempts: u32) -> Self {
		self.retry_attempts = attempts;

		self
	}

	/// Overrides the maximum pooled socket count.
	pub fn max_sockets(mut self, max: usize) -> Self {
		self.max_sockets = max;

		self
	}

	/// Sets the auth health endpoint.
	pub fn auth_health_url(mut self, url: impl Into<String>) -> Self {
		self.auth_health_url = Some(url.into());

		self
	}

	/// Sets the auth token endpoint.
	pub fn auth_token_url(mut self, url: impl Into<String>) -> Self {
		self.auth_token_url = Some(url.into());

		self
	}

	/// Sets the destination endpoint.
	pub fn destination_url(mut self, url: impl Into<String>) -> Self {
		self.destination_url = Some(url.into());

		self
	}

	/// Sets the principal credentials.
	pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self.password = Some(password.into());

		self
	}

	/// Overrides both backoff delays.
	pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
		self.backoff = backoff;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<RelayConfig, ConfigError> {
		let auth_health_url = parse_url("auth health", self.auth_health_url)?;
		let auth_token_url = parse_url("auth token", self.auth_token_url)?;
		let destination_url = parse_url("destination", self.destination_url)?;
		let username = Username::new(self.username.ok_or(ConfigError::MissingField {
			field: "username",
		})?)?;
		let password = self.password.ok_or(ConfigError::MissingField { field: "password" })?;
		let config = RelayConfig {
			retry_attempts: self.retry_attempts,
			max_sockets: self.max_sockets,
			auth_health_url,
			auth_token_url,
			destination_url,
			principal: Principal::new(username, password),
			backoff: self.backoff,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for RelayConfigBuilder {
	fn default() -> Self {
		Self {
			retry_attempts: DEFAULT_RETRY_ATTEMPTS,
			max_sockets: DEFAULT_MAX_SOCKETS,
			auth_health_url: None,
			auth_token_url: None,
			destination_url: None,
			username: None,
			password: None,
			backoff: BackoffPolicy::default(),
		}
	}
}

#[derive(Deserialize)]
struct RelayConfigDocument {
	#[serde(default = "default_retry_attempts", alias = "RETRY_ATTEMPTS")]
	retry_attempts: u32,
	#[serde(default = "default_max_sockets", alias = "MAX_SOCKETS")]
	max_sockets: usize,
	#[serde(alias = "AUTH_HEALTH_URL")]
	auth_health_url: Url,
	#[serde(alias = "AUTH_TOKEN_URL")]
	auth_token_url: Url,
	#[serde(alias = "DESTINATION_TRANSPORT_URL")]
	destination_url: Url,
	#[serde(alias = "USERNAME")]
	username: Username,
	#[serde(alias = "PASSWORD")]
	password: PasswordSecret,
	#[serde(default)]
	backoff: BackoffPolicy,
}
impl TryFrom<RelayConfigDocument> for RelayConfig {
	type Error = ConfigError;

	fn try_from(document: RelayConfigDocument) -> Result<Self, Self::Error> {
		let config = Self {
			retry_attempts: document.retry_attempts,
			max_sockets: document.max_sockets,
			auth_health_url: document.auth_health_url,
			auth_token_url: document.auth_token_url,
			destination_url: document.destination_url,
			principal: Principal { username: document.username, password: document.password },
			backoff: document.backoff,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_retry_attempts() -> u32 {
	DEFAULT_RETRY_ATTEMPTS
}

fn default_max_sockets() -> usize {
	DEFAULT_MAX_SOCKETS
}

fn parse_url(endpoint: &'static str, raw: Option<String>) -> Result<Url, ConfigError> {
	let raw = raw.ok_or(ConfigError::MissingField { field: endpoint })?;

	Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { endpoint, source })
}

fn validate_scheme(endpoint: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { endpoint, url: url.to_string() }),
	}
}

mod duration_ms {
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);

		serializer.serialize_u64(millis)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
