//! Unified error types for Portward.
//!
//! [`PortwardError`] covers everything surfaced to the caller of the
//! orchestrator or the CLI: endpoint validation, config loading, and
//! token resolution. Per-proxy runtime failures (bind errors, shutdown
//! stragglers) are deliberately *not* here: they are logged and
//! recovered locally so one broken endpoint never takes down the rest.
//! Tests match on error kinds, never on message text.

use std::path::PathBuf;

use crate::token::TokenError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PortwardError {
    #[error("no proxy endpoints provided")]
    NoEndpoints,

    #[error("endpoint cannot be empty. Expected format: [LOCAL_PORT:]HOSTNAME[:DEST_PORT]")]
    EmptyEndpoint,

    #[error("invalid endpoint format '{endpoint}'. Expected format: [LOCAL_PORT:]HOSTNAME[:DEST_PORT]")]
    MalformedEndpoint { endpoint: String },

    #[error("invalid local port '{value}': {source}")]
    InvalidLocalPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid destination port '{value}': {source}")]
    InvalidDestinationPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("hostname cannot be empty")]
    EmptyHostname,

    #[error("invalid target URL for {address}: {source}")]
    InvalidTarget {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot specify endpoints via flags when a config file is used")]
    ConflictingSources,

    #[error("config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
