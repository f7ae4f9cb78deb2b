//! Errors raised while assembling the engine from its configuration

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing {capability} bridge: {message}")]
    CapabilityMissing {
        capability: &'static str,
        message: String,
    },

    /// A default bridge could not be constructed
    #[error("Failed to initialize default {bridge}: {source}")]
    BridgeInit {
        bridge: &'static str,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
