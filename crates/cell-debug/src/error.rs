//! Debugger front-end errors.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while configuring fingerprints or moving breakpoint state.
#[derive(Debug, Error)]
pub enum DebugError {
    /// The requested hash method is not one of the known strategies.
    #[error("hash method not supported '{0}'")]
    UnsupportedHashMethod(SmolStr),

    /// A fingerprint was requested before the hasher was configured.
    #[error("hash method not configured")]
    NotConfigured,

    /// Breakpoint snapshot could not be encoded or decoded.
    #[error("invalid breakpoint snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading or writing a snapshot/config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DebugError {
    /// Returns true for errors that make the breakpoint store unusable.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DebugError::UnsupportedHashMethod(_) | DebugError::NotConfigured
        )
    }
}

pub type Result<T, E = DebugError> = std::result::Result<T, E>;
