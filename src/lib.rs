//! Bearer-token REST relay for host messaging services: health-probed startup, cached tokens,
//! pooled sends, and one-shot recovery from expired credentials.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod relay;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Semaphore;
	pub use parking_lot::RwLock;
	pub use reqwest::{
		Client as ReqwestClient, Error as ReqwestError, Method, StatusCode,
		header::{HeaderMap, HeaderValue},
	};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
