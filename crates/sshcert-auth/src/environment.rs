// ABOUTME: Cloud environments and the account context of a certificate request.
// ABOUTME: Computes the identity provider authority for public, sovereign and on-premises clouds.

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tenant used when the caller does not name one.
pub const DEFAULT_TENANT: &str = "organizations";

/// An identity provider deployment that can issue SSH certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, e.g. `AzureCloud`.
    pub name: String,
    /// Base login URL of the identity provider.
    pub active_directory_authority: String,
    /// On-premises (ADFS) deployments use their authority as-is, without a tenant.
    #[serde(default)]
    pub on_premise: bool,
    /// Scope requested for SSH certificates.
    pub ssh_certificate_scope: String,
}

impl Environment {
    pub fn azure_cloud() -> Self {
        Self::public(
            "AzureCloud",
            "https://login.microsoftonline.com/",
            "https://pas.windows.net/CheckMyAccess/Linux/.default",
        )
    }

    pub fn azure_china_cloud() -> Self {
        Self::public(
            "AzureChinaCloud",
            "https://login.chinacloudapi.cn/",
            "https://pas.chinacloudapi.cn/CheckMyAccess/Linux/.default",
        )
    }

    pub fn azure_us_government() -> Self {
        Self::public(
            "AzureUSGovernment",
            "https://login.microsoftonline.us/",
            "https://pasff.usgovcloudapi.net/CheckMyAccess/Linux/.default",
        )
    }

    fn public(name: &str, authority: &str, scope: &str) -> Self {
        Self {
            name: name.to_string(),
            active_directory_authority: authority.to_string(),
            on_premise: false,
            ssh_certificate_scope: scope.to_string(),
        }
    }

    /// All environments known without configuration.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::azure_cloud(),
            Self::azure_china_cloud(),
            Self::azure_us_government(),
        ]
    }

    /// Authority URL for `tenant_id`, always ending in `/`.
    ///
    /// Public clouds append the tenant (or [`DEFAULT_TENANT`] when empty);
    /// on-premises environments return their authority unchanged.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidUrl` if the authority is not a valid URL.
    pub fn authority(&self, tenant_id: &str) -> Result<Url> {
        let base = parse_url(&self.active_directory_authority)?;
        let base = with_trailing_slash(base);
        if self.on_premise {
            return Ok(base);
        }

        let tenant = match tenant_id.trim() {
            "" => DEFAULT_TENANT,
            t => validate_tenant(t)?,
        };
        let joined = base.join(tenant).map_err(|e| AuthError::InvalidUrl {
            url: format!("{base}{tenant}"),
            source: e,
        })?;
        Ok(with_trailing_slash(joined))
    }
}

/// The signed-in user a certificate is requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// User principal name, forwarded to the provider as a login hint.
    pub username: Option<String>,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }
}

/// A tenant is joined onto the authority, so it must stay one path segment.
fn validate_tenant(tenant: &str) -> Result<&str> {
    let forbidden = |c: char| matches!(c, '/' | '\\' | ':' | '?' | '#' | '%') || c.is_whitespace();
    if tenant == "." || tenant == ".." || tenant.contains(forbidden) {
        return Err(AuthError::InvalidTenant(tenant.to_string()));
    }
    Ok(tenant)
}

pub(crate) fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AuthError::InvalidUrl {
        url: raw.to_string(),
        source: e,
    })
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
