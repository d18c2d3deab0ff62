// ABOUTME: ssh_config host entries that pair an issued certificate with its private key.
// ABOUTME: Renders one Host block per alias for the target machine.

use std::fmt;
use std::path::{Path, PathBuf};

/// A `Host` block for `~/.ssh/config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfigEntry {
    pub host: String,
    pub host_name: String,
    pub certificate_file: PathBuf,
    pub identity_file: PathBuf,
}

impl SshConfigEntry {
    /// Entries for a machine reachable at `ip`.
    ///
    /// Always includes one entry keyed by the address itself; adds a
    /// `<resource_group>-<name>` alias when both parts are known.
    pub fn for_machine(
        ip: &str,
        resource_group: Option<&str>,
        name: Option<&str>,
        certificate_file: &Path,
        identity_file: &Path,
    ) -> Vec<Self> {
        let entry = |host: String| Self {
            host,
            host_name: ip.to_string(),
            certificate_file: certificate_file.to_path_buf(),
            identity_file: identity_file.to_path_buf(),
        };

        let mut entries = Vec::with_capacity(2);
        if let (Some(rg), Some(vm)) = (resource_group, name) {
            entries.push(entry(format!("{rg}-{vm}")));
        }
        entries.push(entry(ip.to_string()));
        entries
    }
}

impl fmt::Display for SshConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host {}", self.host)?;
        writeln!(f, "  HostName {}", self.host_name)?;
        writeln!(f, "  CertificateFile \"{}\"", self.certificate_file.display())?;
        write!(f, "  IdentityFile \"{}\"", self.identity_file.display())
    }
}
