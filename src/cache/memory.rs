//! Thread-safe in-process [`TokenCache`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, Username},
	cache::{CacheFuture, TokenCache},
};

type TokenMap = Arc<RwLock<HashMap<Username, TokenSecret>>>;

/// Process-local token cache with overwrite-only semantics and no expiry.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache(TokenMap);
impl MemoryTokenCache {
	/// Returns the cached token without going through the async contract.
	pub fn get(&self, username: &str) -> Option<TokenSecret> {
		self.0.read().get(username).cloned()
	}

	/// Number of principals with a cached token.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenCache for MemoryTokenCache {
	fn fetch<'a>(&'a self, username: &'a Username) -> CacheFuture<'a, Option<TokenSecret>> {
		let token = self.get(username);

		Box::pin(async move { Ok(token) })
	}

	fn save<'a>(&'a self, username: &'a Username, token: TokenSecret) -> CacheFuture<'a, ()> {
		self.0.write().insert(username.to_owned(), token);

		Box::pin(async { Ok(()) })
	}
}
