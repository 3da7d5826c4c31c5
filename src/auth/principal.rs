//! Principal identity presented to the authentication service.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{_prelude::*, auth::PasswordSecret};

const USERNAME_MAX_LEN: usize = 128;

/// Error returned when username validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum UsernameError {
	/// The username was empty.
	#[error("Username cannot be empty.")]
	Empty,
	/// The username contains whitespace characters.
	#[error("Username contains whitespace.")]
	ContainsWhitespace,
	/// The username exceeded the allowed character count.
	#[error("Username exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated principal username; also the token cache key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);
impl Username {
	/// Creates a new username after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, UsernameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for Username {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Username {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Username {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<Username> for String {
	fn from(value: Username) -> Self {
		value.0
	}
}
impl TryFrom<String> for Username {
	type Error = UsernameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for Username {
	type Err = UsernameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for Username {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Username({})", self.0)
	}
}
impl Display for Username {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Username + password pair posted to the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Principal {
	/// Principal username.
	pub username: Username,
	/// Principal secret.
	pub password: PasswordSecret,
}
impl Principal {
	/// Pairs a username with its secret.
	pub fn new(username: Username, password: impl Into<String>) -> Self {
		Self { username, password: PasswordSecret::new(password) }
	}

	/// Serializes the `{"username", "password"}` body sent to the token endpoint.
	pub fn token_request_body(&self) -> Result<Vec<u8>, serde_json::Error> {
		#[derive(Serialize)]
		struct TokenRequestBody<'a> {
			username: &'a str,
			password: &'a str,
		}

		serde_json::to_vec(&TokenRequestBody {
			username: &self.username,
			password: self.password.expose(),
		})
	}
}

fn validate_view(view: &str) -> Result<(), UsernameError> {
	if view.is_empty() {
		return Err(UsernameError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(UsernameError::ContainsWhitespace);
	}
	if view.len() > USERNAME_MAX_LEN {
		return Err(UsernameError::TooLong { max: USERNAME_MAX_LEN });
	}

	Ok(())
}
