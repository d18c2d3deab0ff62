// ABOUTME: Certificate authentication flow: builds the JWK-bound token request and drives sign-in.
// ABOUTME: Tries interactive login on a free loopback port, falling back to the non-interactive path.

use crate::config::{RedirectConfig, DEFAULT_CLIENT_ID};
use crate::environment::{Account, Environment};
use crate::error::{AuthError, Result};
use crate::port::{redirect_uri, select_redirect_port, LoopbackBinder, PortBinder};
use crate::provider::{AccessToken, PromptSink, TokenProvider, TokenRequest};
use sshcert_ssh::{SshCertificateAuthParameters, SshCredential};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shown when interactive sign-in fails and the device code path takes over.
pub const FALLBACK_MESSAGE: &str =
    "Unable to authenticate using interactive login. Defaulting back to device code flow.";

/// Issues SSH certificates by requesting a JWK-bound token from a provider.
pub struct CertificateAuthenticationFlow {
    provider: Arc<dyn TokenProvider>,
    prompt: Arc<dyn PromptSink>,
    binder: Arc<dyn PortBinder>,
    redirect: RedirectConfig,
    client_id: String,
}

impl CertificateAuthenticationFlow {
    pub fn new(provider: Arc<dyn TokenProvider>, prompt: Arc<dyn PromptSink>) -> Self {
        Self {
            provider,
            prompt,
            binder: Arc::new(LoopbackBinder),
            redirect: RedirectConfig::default(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
        }
    }

    /// Replace the loopback port binder.
    pub fn with_port_binder(mut self, binder: Arc<dyn PortBinder>) -> Self {
        self.binder = binder;
        self
    }

    /// Replace the redirect port range.
    pub fn with_redirect(mut self, redirect: RedirectConfig) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Request an SSH certificate bound to the key in `params`.
    ///
    /// With `interactive` set, a browser sign-in is attempted first on the
    /// first free redirect port. Any recoverable failure (no free port,
    /// rejected sign-in, transport error) falls back to the non-interactive
    /// path exactly once. Cancellation is returned as-is and never falls back.
    ///
    /// # Errors
    /// Returns `AuthError::Cancelled` when `cancel` fires, otherwise the
    /// error of the last attempted path.
    pub async fn issue_certificate(
        &self,
        params: &SshCertificateAuthParameters,
        account: &Account,
        environment: &Environment,
        tenant_id: &str,
        interactive: bool,
        cancel: &CancellationToken,
    ) -> Result<SshCredential> {
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }

        let request = self.token_request(params, account, environment, tenant_id)?;
        info!(
            environment = %environment.name,
            authority = %request.authority,
            key_id = %request.key_id,
            interactive,
            "requesting ssh certificate"
        );

        let token = if interactive {
            match self.acquire_interactive(&request, cancel).await {
                Ok(token) => token,
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "interactive sign-in failed, falling back");
                    self.prompt.prompt(FALLBACK_MESSAGE);
                    self.acquire_non_interactive(&request, cancel).await?
                }
                Err(e) => return Err(e),
            }
        } else {
            self.acquire_non_interactive(&request, cancel).await?
        };

        Ok(params.format_credential(&token.token))
    }

    fn token_request(
        &self,
        params: &SshCertificateAuthParameters,
        account: &Account,
        environment: &Environment,
        tenant_id: &str,
    ) -> Result<TokenRequest> {
        Ok(TokenRequest {
            client_id: self.client_id.clone(),
            authority: environment.authority(tenant_id)?,
            use_adfs: environment.on_premise,
            scopes: vec![environment.ssh_certificate_scope.clone()],
            jwk: params.jwk()?,
            key_id: params.key_id().to_string(),
            login_hint: account.username.clone(),
        })
    }

    async fn acquire_interactive(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        let port = select_redirect_port(self.binder.as_ref(), &self.redirect, self.prompt.as_ref())?;
        let redirect = redirect_uri(port)?;
        info!(%redirect, "starting interactive sign-in");

        cancellable(
            cancel,
            self.provider.acquire_interactive(request, &redirect, cancel),
        )
        .await
    }

    async fn acquire_non_interactive(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        cancellable(cancel, self.provider.acquire_non_interactive(request, cancel)).await
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuthError::Cancelled),
        res = fut => res,
    }
}
