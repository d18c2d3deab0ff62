// ABOUTME: OpenSSH public key decoding and SSH certificate request parameters.
// ABOUTME: Wire decoder, ssh-rsa parser, fingerprints, JWK binding and certificate credential.

//! # sshcert-ssh
//!
//! Everything needed to turn an OpenSSH public key line into the
//! proof-of-possession parameters of an SSH certificate request, and to turn
//! the issued token back into certificate text.
//!
//! ## Features
//!
//! - **Wire decoding**: length-prefixed field iterator over the key blob
//! - **RSA parsing**: exponent/modulus extraction with a cached key id
//! - **Fingerprinting**: `SHA256:` fingerprints matching `ssh-keygen -l`
//! - **Request parameters**: JWK + key id per key type
//!
//! ## Example
//!
//! ```no_run
//! use sshcert_ssh::{RsaPublicKey, SshCertificateAuthParameters};
//!
//! let line = std::fs::read_to_string("id_rsa.pub").expect("key should load");
//! let key = RsaPublicKey::parse(&line).expect("key should parse");
//! println!("Key {} ({})", key.key_id(), key.fingerprint());
//!
//! let params = SshCertificateAuthParameters::from_public_key(&key);
//! let jwk = params.jwk().expect("jwk should serialize");
//!
//! // ... exchange jwk + key id for an access token ...
//! let credential = params.format_credential("<token>");
//! println!("{}", credential.certificate());
//! ```

mod credential;
mod error;
mod fingerprint;
mod params;
mod rsa;
pub mod wire;

pub use credential::SshCredential;
pub use error::{Result, SshError};
pub use fingerprint::compute_fingerprint;
pub use params::{JsonWebKey, SshCertificateAuthParameters, SshKeyType, RSA_EXPONENT};
pub use rsa::{key_id_for_modulus, RsaPublicKey, SSH_RSA};
pub use wire::{KeyBlob, KeyFields};
