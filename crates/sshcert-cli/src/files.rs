// ABOUTME: Key and certificate file handling for the sshcert CLI.
// ABOUTME: Reads the public key line and writes the issued certificate next to it.

use anyhow::{Context, Result};
use sshcert_ssh::{RsaPublicKey, SshCredential};
use std::path::{Path, PathBuf};

/// Read and parse an OpenSSH public key file.
pub fn read_public_key(path: &Path) -> Result<RsaPublicKey> {
    let line = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read public key {}", path.display()))?;

    RsaPublicKey::parse(&line).map_err(|e| {
        let what = if e.is_wire_error() {
            "Public key data is corrupt"
        } else {
            "Public key is not a supported OpenSSH RSA key"
        };
        anyhow::Error::new(e).context(format!("{what}: {}", path.display()))
    })
}

/// Certificate path for a public key: same directory, same stem, `.cer`.
///
/// The directory is made absolute so the path can go into `ssh_config`.
pub fn certificate_path_for(public_key: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(public_key)
        .with_context(|| format!("Failed to resolve {}", public_key.display()))?;
    let stem = absolute
        .file_stem()
        .with_context(|| format!("Public key path has no file name: {}", public_key.display()))?;

    let mut name = stem.to_os_string();
    name.push(".cer");
    Ok(absolute.with_file_name(name))
}

/// Write the certificate text to `path` as-is, replacing any previous certificate.
pub fn write_certificate(path: &Path, credential: &SshCredential) -> Result<()> {
    std::fs::write(path, credential.certificate())
        .with_context(|| format!("Failed to write certificate {}", path.display()))
}
