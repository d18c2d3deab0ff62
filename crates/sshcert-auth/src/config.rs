// ABOUTME: Configuration loading and management for sshcert
// ABOUTME: TOML config with defaults for client id, redirect ports and custom environments

use crate::environment::Environment;
use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public client id used for SSH certificate sign-in.
pub const DEFAULT_CLIENT_ID: &str = "1950a258-227b-4e31-a9cf-717495945fc2";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client id presented to the identity provider
    pub client_id: String,
    /// Tenant to sign in to (defaults to "organizations")
    pub tenant_id: Option<String>,
    /// Name of the environment to use
    pub environment: String,
    /// User principal name passed as a login hint
    pub account: Option<String>,
    /// Interactive redirect settings
    pub redirect: RedirectConfig,
    /// Device code flow settings
    pub device_code: DeviceCodeConfig,
    /// Additional or overriding environments
    pub environments: Vec<Environment>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            tenant_id: None,
            environment: Environment::azure_cloud().name,
            account: None,
            redirect: RedirectConfig::default(),
            device_code: DeviceCodeConfig::default(),
            environments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// First loopback port tried for the redirect listener
    pub base_port: u16,
    /// How many consecutive ports to try
    pub max_attempts: u16,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            base_port: 8400,
            max_attempts: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCodeConfig {
    /// Timeout for each HTTP request to the identity provider
    pub http_timeout_secs: u64,
}

impl Default for DeviceCodeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
        }
    }
}

impl DeviceCodeConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Config {
    /// Get the XDG config directory for sshcert (~/.config/sshcert)
    pub fn config_dir() -> Result<PathBuf> {
        config_dir_from(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the XDG config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AuthError::ReadConfig {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| AuthError::ParseConfig {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Look up an environment by name (case-insensitive).
    ///
    /// Configured environments take precedence over the built-in ones.
    pub fn resolve_environment(&self, name: &str) -> Result<Environment> {
        self.environments
            .iter()
            .cloned()
            .chain(Environment::builtin())
            .find(|env| env.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AuthError::UnknownEnvironment(name.to_string()))
    }

    /// Generate a default config file content
    pub fn default_toml() -> String {
        format!(
            r#"# sshcert configuration
# Location: ~/.config/sshcert/config.toml

# client_id = "{DEFAULT_CLIENT_ID}"
# tenant_id = "00000000-0000-0000-0000-000000000000"
environment = "AzureCloud"
# account = "user@contoso.com"

[redirect]
base_port = 8400
max_attempts = 600

[device_code]
http_timeout_secs = 30

# [[environments]]
# name = "ContosoStack"
# active_directory_authority = "https://adfs.contoso.com/adfs"
# on_premise = true
# ssh_certificate_scope = "https://pas.contoso.com/CheckMyAccess/Linux/.default"
"#
        )
    }
}

fn config_dir_from(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_config_home {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home.ok_or(AuthError::NoConfigDir)?.join(".config"),
    };
    Ok(base.join("sshcert"))
}
