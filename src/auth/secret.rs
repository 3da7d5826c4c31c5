//! Secret wrappers that redact sensitive material.

// self
use crate::_prelude::*;

macro_rules! def_secret {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);
		impl $name {
			/// Wraps a new secret string.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// Returns the inner value. Callers must avoid logging this string.
			pub fn expose(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.expose()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
}

def_secret! { TokenSecret, "Bearer token issued by the authentication service." }
def_secret! { PasswordSecret, "Principal password presented to the authentication service." }

impl TokenSecret {
	/// Decodes a token endpoint response body.
	///
	/// The body is the raw token. A body that is a JSON string literal is unquoted. Falsy
	/// bodies yield `None`: empty, `null`, `false`, `""`, and any numeric zero (`0`, `0.0`, `-0`).
	pub fn from_response_body(body: &[u8]) -> Option<Self> {
		let text = String::from_utf8_lossy(body);
		let text = text.trim();

		if text.is_empty() {
			return None;
		}

		match serde_json::from_str::<serde_json::Value>(text) {
			Ok(serde_json::Value::String(value)) if value.is_empty() => None,
			Ok(serde_json::Value::String(value)) => Some(Self(value)),
			Ok(serde_json::Value::Null | serde_json::Value::Bool(false)) => None,
			Ok(serde_json::Value::Number(number)) if number.as_f64() == Some(0.0) => None,
			_ => Some(Self(text.to_owned())),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let token = TokenSecret::new("super-secret");
		let password = PasswordSecret::new("hunter2");

		assert_eq!(format!("{token:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(format!("{password:?}"), "PasswordSecret(\"<redacted>\")");
	}

	#[test]
	fn response_body_decoding_treats_falsy_bodies_as_missing() {
		assert!(TokenSecret::from_response_body(b"").is_none());
		assert!(TokenSecret::from_response_body(b"  \n").is_none());
		assert!(TokenSecret::from_response_body(b"null").is_none());
		assert!(TokenSecret::from_response_body(b"false").is_none());
		assert!(TokenSecret::from_response_body(b"\"\"").is_none());
		assert!(TokenSecret::from_response_body(b"0").is_none());
		assert!(TokenSecret::from_response_body(b"0.0").is_none());
		assert!(TokenSecret::from_response_body(b"-0").is_none());
	}

	#[test]
	fn response_body_decoding_keeps_non_zero_numbers() {
		let token = TokenSecret::from_response_body(b"42").expect("Non-zero number is a token.");

		assert_eq!(token.expose(), "42");
	}

	#[test]
	fn response_body_decoding_accepts_raw_and_quoted_tokens() {
		let raw = TokenSecret::from_response_body(b"tok1").expect("Raw token should decode.");
		let quoted =
			TokenSecret::from_response_body(b"\"tok2\"").expect("Quoted token should decode.");
		let jwt = TokenSecret::from_response_body(b"eyJhbGciOi.eyJzdWIi.sig\n")
			.expect("JWT-shaped token should decode.");

		assert_eq!(raw.expose(), "tok1");
		assert_eq!(quoted.expose(), "tok2");
		assert_eq!(jwt.expose(), "eyJhbGciOi.eyJzdWIi.sig");
	}
}
