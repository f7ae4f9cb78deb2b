//! # Core Runtime Module
//!
//! Ambient infrastructure for the file access engine:
//! - [`config`]: bridge injection and tunables, with desktop defaults behind
//!   the `desktop-shims` feature
//! - [`logging`]: `tracing-subscriber` setup and host log forwarding
//! - [`error`]: configuration and initialization failures

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
