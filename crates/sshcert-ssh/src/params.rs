// ABOUTME: Proof-of-possession parameters for an SSH certificate request.
// ABOUTME: One variant per key algorithm, each exposing key type, JWK, key id and cert formatting.

use crate::credential::SshCredential;
use crate::error::{Result, SshError};
use crate::rsa::{key_id_for_modulus, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public exponent advertised in every RSA JWK (65537).
pub const RSA_EXPONENT: &str = "AQAB";

/// Key algorithms a certificate can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SshKeyType {
    #[serde(rename = "RSA")]
    Rsa,
}

impl SshKeyType {
    /// JWK `kty` value for this key type.
    pub fn jwk_kty(self) -> &'static str {
        match self {
            SshKeyType::Rsa => "RSA",
        }
    }

    /// Marker that prefixes the issued certificate text.
    pub fn certificate_prefix(self) -> &'static str {
        match self {
            SshKeyType::Rsa => "ssh-rsa-cert-v01@openssh.com",
        }
    }
}

impl fmt::Display for SshKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jwk_kty())
    }
}

/// JSON web key sent as the `req_cnf` of a certificate request.
///
/// Field order is part of the wire contract: `kty`, `n`, `e`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    pub n: String,
    pub e: String,
}

/// Parameters binding a certificate request to a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshCertificateAuthParameters {
    Rsa { jwk: JsonWebKey, key_id: String },
}

impl SshCertificateAuthParameters {
    /// Build RSA parameters from a base64 modulus.
    ///
    /// The JWK always carries [`RSA_EXPONENT`], not the key's own exponent.
    pub fn from_rsa_components(modulus: &str) -> Self {
        SshCertificateAuthParameters::Rsa {
            jwk: JsonWebKey {
                kty: SshKeyType::Rsa.jwk_kty().to_string(),
                n: modulus.to_string(),
                e: RSA_EXPONENT.to_string(),
            },
            key_id: key_id_for_modulus(modulus),
        }
    }

    /// Build RSA parameters from a parsed public key.
    pub fn from_public_key(key: &RsaPublicKey) -> Self {
        Self::from_rsa_components(key.modulus())
    }

    pub fn key_type(&self) -> SshKeyType {
        match self {
            SshCertificateAuthParameters::Rsa { .. } => SshKeyType::Rsa,
        }
    }

    /// Serialize the JWK to compact JSON.
    ///
    /// # Errors
    /// Returns `SshError::SerializeJwk` if serialization fails.
    pub fn jwk(&self) -> Result<String> {
        serde_json::to_string(self.json_web_key()).map_err(SshError::SerializeJwk)
    }

    pub fn json_web_key(&self) -> &JsonWebKey {
        match self {
            SshCertificateAuthParameters::Rsa { jwk, .. } => jwk,
        }
    }

    /// Key id bound to the request alongside the JWK.
    pub fn key_id(&self) -> &str {
        match self {
            SshCertificateAuthParameters::Rsa { key_id, .. } => key_id,
        }
    }

    /// Turn an issued access token into certificate text for this key type.
    pub fn format_credential(&self, access_token: &str) -> SshCredential {
        SshCredential::new(self.key_type(), access_token)
    }
}
