//! Focus Ambience CLI Library
//!
//! Configuration loading and session command handling for the `ambience`
//! binary, exposed for testing.

pub mod config;
pub mod error;
pub mod session;

pub use config::{AmbienceConfig, AudioSettings};
pub use error::{CliError, Result};
pub use session::SessionCommand;
