//! Token cache contract and the built-in in-memory implementation.
//!
//! The cache maps a principal username to the last bearer token the authentication service
//! issued for it. Entries never expire on their own: the relay overwrites them after every
//! successful token fetch and detects staleness reactively through `401` responses. Hosts that
//! manage expiry themselves can plug in their own [`TokenCache`].

pub mod memory;

pub use memory::MemoryTokenCache;

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, Username},
};

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Storage backend contract for cached bearer tokens.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the token cached for `username`, if any.
	fn fetch<'a>(&'a self, username: &'a Username) -> CacheFuture<'a, Option<TokenSecret>>;

	/// Stores `token` for `username`, replacing any previous value.
	fn save<'a>(&'a self, username: &'a Username, token: TokenSecret) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the cache engine.
	#[error("Token cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
