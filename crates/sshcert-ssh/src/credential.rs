// ABOUTME: SSH client certificate credential built from an issued access token.
// ABOUTME: Holds the key type and the "<cert-marker> <token>" text handed to ssh.

use crate::params::SshKeyType;
use std::fmt;

/// A signed SSH certificate ready to be written next to its public key.
#[derive(Clone, PartialEq, Eq)]
pub struct SshCredential {
    key_type: SshKeyType,
    certificate: String,
}

impl SshCredential {
    /// Format `access_token` as certificate text for `key_type`.
    ///
    /// The token is taken as-is; the identity provider is the trust boundary.
    pub fn new(key_type: SshKeyType, access_token: &str) -> Self {
        Self {
            key_type,
            certificate: format!("{} {}", key_type.certificate_prefix(), access_token),
        }
    }

    pub fn key_type(&self) -> SshKeyType {
        self.key_type
    }

    /// Certificate text in OpenSSH `.cer` form.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }
}

// Certificates are bearer material; keep them out of debug logs.
impl fmt::Debug for SshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCredential")
            .field("key_type", &self.key_type)
            .field("certificate", &"<redacted>")
            .finish()
    }
}
