// ABOUTME: Error types for certificate issuance using thiserror.
// ABOUTME: Splits recoverable authentication failures from cancellation and setup errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring an SSH certificate.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Every candidate redirect port was already taken.
    #[error("no available redirect port in {first}..={last}")]
    NoAvailablePort { first: u16, last: u16 },

    /// The identity provider or the user did not complete sign-in.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The caller cancelled the request.
    #[error("authentication was cancelled")]
    Cancelled,

    /// A request to the identity provider could not be sent or read.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// An authority or redirect URL could not be built.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The tenant cannot be used as a single authority path segment.
    #[error("invalid tenant {0:?}: expected a tenant id or domain name")]
    InvalidTenant(String),

    /// No built-in or configured environment has this name.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// The request parameters could not be encoded.
    #[error(transparent)]
    Key(#[from] sshcert_ssh::SshError),

    /// Neither `XDG_CONFIG_HOME` nor a home directory is available.
    #[error("could not determine the config directory: no home directory")]
    NoConfigDir,

    /// Failed to read the config file.
    #[error("failed to read config from {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the config file.
    #[error("failed to parse config from {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl AuthError {
    /// Whether an interactive attempt that failed this way may fall back to
    /// the non-interactive flow.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::NoAvailablePort { .. }
                | AuthError::AuthenticationFailed(_)
                | AuthError::Http { .. }
        )
    }
}

/// Result type alias using AuthError.
pub type Result<T> = std::result::Result<T, AuthError>;
