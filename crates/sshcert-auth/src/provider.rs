// ABOUTME: Collaborator seams of the issuance flow: token provider and prompt sink.
// ABOUTME: Token requests carry the JWK and key id that bind the certificate to the key.

use crate::error::{AuthError, Result};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a provider needs to request a JWK-bound SSH certificate token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub client_id: String,
    /// Authority URL, ending in `/`.
    pub authority: Url,
    /// True for on-premises (ADFS) authorities.
    pub use_adfs: bool,
    pub scopes: Vec<String>,
    /// Serialized JSON web key (`req_cnf`).
    pub jwk: String,
    pub key_id: String,
    pub login_hint: Option<String>,
}

/// An access token returned by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Lifetime in seconds, when the provider reports it.
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_in: None,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Source of JWK-bound access tokens.
///
/// Implementations should check `cancel` at their own suspension points; the
/// flow additionally races every call against it.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Acquire a token through a browser sign-in that redirects to `redirect_uri`.
    ///
    /// Providers without an interactive capability keep the default, which
    /// fails with a recoverable error so the flow falls back.
    async fn acquire_interactive(
        &self,
        request: &TokenRequest,
        redirect_uri: &Url,
        cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        let _ = (request, redirect_uri, cancel);
        Err(AuthError::AuthenticationFailed(
            "interactive sign-in is not supported by this provider".to_string(),
        ))
    }

    /// Acquire a token without a local redirect (silent or device code).
    async fn acquire_non_interactive(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<AccessToken>;
}

/// Sink for user-facing, non-fatal messages (port warnings, device code instructions).
pub trait PromptSink: Send + Sync {
    fn prompt(&self, message: &str);
}

impl<F> PromptSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn prompt(&self, message: &str) {
        self(message)
    }
}

/// Writes prompts to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrPrompt;

impl PromptSink for StderrPrompt {
    fn prompt(&self, message: &str) {
        eprintln!("{message}");
    }
}
