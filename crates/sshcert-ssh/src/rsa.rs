// ABOUTME: Parser for `ssh-rsa` OpenSSH public key lines.
// ABOUTME: Extracts exponent and modulus as canonical base64 and derives a key id.

use crate::error::{Result, SshError};
use crate::fingerprint::compute_fingerprint;
use crate::wire::KeyBlob;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::trace;

/// Algorithm label of RSA public keys in OpenSSH format.
pub const SSH_RSA: &str = "ssh-rsa";

/// Number of wire fields in an RSA public key: algorithm, exponent, modulus.
const RSA_FIELD_COUNT: usize = 3;

/// Number of digest bytes kept for the key id.
const KEY_ID_BYTES: usize = 8;

/// An `ssh-rsa` public key parsed from its OpenSSH text form.
#[derive(Debug)]
pub struct RsaPublicKey {
    algorithm: String,
    exponent: String,
    modulus: String,
    blob: KeyBlob,
    key_id: OnceLock<String>,
}

impl RsaPublicKey {
    /// Parse `"ssh-rsa <base64> [comment]"`.
    ///
    /// # Errors
    /// - `InvalidKeyFormat` if there are fewer than two tokens, the blob does
    ///   not hold exactly three fields, or a numeric field is empty.
    /// - `UnsupportedAlgorithm` if the label or the embedded tag is not `ssh-rsa`.
    /// - `MalformedEncoding` / `TruncatedField` if the blob cannot be decoded.
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let (Some(label), Some(encoded)) = (tokens.next(), tokens.next()) else {
            return Err(SshError::InvalidKeyFormat(
                "public key needs at least 2 parts (algorithm, encoded key)".to_string(),
            ));
        };

        if label != SSH_RSA {
            return Err(SshError::UnsupportedAlgorithm(label.to_string()));
        }

        let blob = KeyBlob::decode(encoded)?;
        let fields = blob.collect_fields()?;
        let [tag, exponent, modulus] = fields[..] else {
            return Err(SshError::InvalidKeyFormat(format!(
                "expected {RSA_FIELD_COUNT} fields (algorithm, exponent, modulus), found {}",
                fields.len()
            )));
        };

        if tag != SSH_RSA.as_bytes() {
            return Err(SshError::UnsupportedAlgorithm(
                String::from_utf8_lossy(tag).into_owned(),
            ));
        }
        if exponent.is_empty() || modulus.is_empty() {
            return Err(SshError::InvalidKeyFormat(
                "exponent and modulus must not be empty".to_string(),
            ));
        }

        trace!(
            blob_len = blob.as_bytes().len(),
            modulus_len = modulus.len(),
            "decoded ssh-rsa key"
        );
        let exponent = STANDARD.encode(exponent);
        let modulus = STANDARD.encode(modulus);

        Ok(Self {
            algorithm: SSH_RSA.to_string(),
            exponent,
            modulus,
            blob,
            key_id: OnceLock::new(),
        })
    }

    /// Algorithm tag, always `ssh-rsa`.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Public exponent as standard base64 of its big-endian bytes.
    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    /// Modulus as standard base64 of its big-endian bytes (leading zero kept).
    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    /// Correlation id for this key, computed on first use.
    pub fn key_id(&self) -> &str {
        self.key_id.get_or_init(|| key_id_for_modulus(&self.modulus))
    }

    /// `SHA256:` fingerprint of the key blob, as printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> String {
        compute_fingerprint(&self.blob)
    }
}

impl FromStr for RsaPublicKey {
    type Err = SshError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Derive the key id sent alongside a certificate request.
///
/// Lowercase hex of the first 8 bytes of SHA-256 over the base64 modulus.
pub fn key_id_for_modulus(modulus: &str) -> String {
    let digest = Sha256::digest(modulus.as_bytes());
    hex::encode(&digest[..KEY_ID_BYTES])
}
