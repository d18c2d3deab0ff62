// ABOUTME: SSH public key fingerprint computation.
// ABOUTME: Produces the SHA256:<base64> form printed by ssh-keygen -l.

use crate::wire::KeyBlob;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Compute the OpenSSH SHA256 fingerprint of a key blob.
///
/// The hash covers the full wire blob (algorithm name plus key fields), and
/// the digest is rendered as unpadded standard base64 behind a `SHA256:` tag.
pub fn compute_fingerprint(blob: &KeyBlob) -> String {
    let mut hasher = Sha256::new();
    hasher.update(blob.as_bytes());
    let hash = hasher.finalize();

    format!("SHA256:{}", STANDARD_NO_PAD.encode(hash))
}
