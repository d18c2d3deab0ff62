// ABOUTME: Error types for OpenSSH key decoding using thiserror.
// ABOUTME: Separates wire-level decoding failures from key validation failures.

use thiserror::Error;

/// Errors that can occur while decoding or validating an SSH public key.
#[derive(Error, Debug)]
pub enum SshError {
    /// The key blob is not valid base64.
    #[error("malformed key encoding: {0}")]
    MalformedEncoding(#[source] base64::DecodeError),

    /// A field declares more bytes than remain in the blob.
    #[error("truncated field at offset {offset}: needs {needed} bytes, {available} available")]
    TruncatedField {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The key text or its fields do not have the expected shape.
    #[error("invalid public key format: {0}")]
    InvalidKeyFormat(String),

    /// The key is not encoded with a supported algorithm.
    #[error("unsupported key algorithm: {0} (only ssh-rsa is supported)")]
    UnsupportedAlgorithm(String),

    /// Failed to serialize the JSON web key.
    #[error("failed to serialize JWK: {0}")]
    SerializeJwk(#[source] serde_json::Error),
}

impl SshError {
    /// True for errors raised while reading the wire format itself.
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            SshError::MalformedEncoding(_) | SshError::TruncatedField { .. }
        )
    }
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;
