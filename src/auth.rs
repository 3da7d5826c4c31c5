//! Principal credentials and redacted bearer token models.

pub mod principal;
pub mod secret;

pub use principal::*;
pub use secret::*;
