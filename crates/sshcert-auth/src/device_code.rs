// ABOUTME: Device code token provider for the non-interactive issuance path.
// ABOUTME: Requests a user code, shows the sign-in message, and polls for an ssh-cert token.

use crate::error::{AuthError, Result};
use crate::provider::{AccessToken, PromptSink, TokenProvider, TokenRequest};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Token type that asks the provider for an SSH certificate instead of a bearer token.
const SSH_CERT_TOKEN_TYPE: &str = "ssh-cert";

/// Poll interval used when the provider does not send one.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest wait between polls, whatever the provider asks for.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest wait between polls, including `slow_down` backoff.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Device codes are never polled for longer than this.
const MAX_CODE_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Extra delay added after a `slow_down` response.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

fn poll_interval(secs: Option<u64>) -> Duration {
    secs.map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL)
        .clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

fn slow_down(interval: Duration) -> Duration {
    interval
        .saturating_add(SLOW_DOWN_STEP)
        .min(MAX_POLL_INTERVAL)
}

fn poll_deadline(now: Instant, expires_in: u64) -> Result<Instant> {
    let lifetime = Duration::from_secs(expires_in).min(MAX_CODE_LIFETIME);
    now.checked_add(lifetime).ok_or_else(|| {
        AuthError::AuthenticationFailed(format!("device code lifetime {expires_in}s is out of range"))
    })
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_url")]
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

impl DeviceCodeResponse {
    fn instructions(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
                self.verification_uri, self.user_code
            )
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum PollOutcome {
    Issued(AccessToken),
    Pending,
    SlowDown,
    Failed(String),
}

impl From<TokenResponse> for PollOutcome {
    fn from(resp: TokenResponse) -> Self {
        if let Some(token) = resp.access_token {
            return PollOutcome::Issued(AccessToken {
                token,
                expires_in: resp.expires_in,
            });
        }

        match resp.error.as_deref() {
            Some("authorization_pending") => PollOutcome::Pending,
            Some("slow_down") => PollOutcome::SlowDown,
            Some(code) => PollOutcome::Failed(match resp.error_description {
                Some(desc) => format!("{code}: {desc}"),
                None => code.to_string(),
            }),
            None => PollOutcome::Failed("token response had neither a token nor an error".into()),
        }
    }
}

/// OAuth device code endpoints under an authority.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoints {
    device_code: Url,
    token: Url,
}

impl Endpoints {
    fn for_request(request: &TokenRequest) -> Result<Self> {
        let prefix = if request.use_adfs {
            "oauth2/"
        } else {
            "oauth2/v2.0/"
        };
        let join = |path: &str| {
            request
                .authority
                .join(&format!("{prefix}{path}"))
                .map_err(|e| AuthError::InvalidUrl {
                    url: format!("{}{prefix}{path}", request.authority),
                    source: e,
                })
        };

        Ok(Self {
            device_code: join("devicecode")?,
            token: join("token")?,
        })
    }
}

fn device_code_form(request: &TokenRequest) -> Vec<(&'static str, String)> {
    vec![
        ("client_id", request.client_id.clone()),
        ("scope", request.scopes.join(" ")),
    ]
}

fn token_form(request: &TokenRequest, device_code: &str) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("grant_type", DEVICE_CODE_GRANT.to_string()),
        ("client_id", request.client_id.clone()),
        ("device_code", device_code.to_string()),
        ("token_type", SSH_CERT_TOKEN_TYPE.to_string()),
        ("req_cnf", request.jwk.clone()),
        ("key_id", request.key_id.clone()),
    ];
    if let Some(hint) = &request.login_hint {
        form.push(("login_hint", hint.clone()));
    }
    form
}

/// Non-interactive provider using the OAuth 2.0 device authorization grant.
pub struct DeviceCodeProvider {
    client: reqwest::Client,
    prompt: Arc<dyn PromptSink>,
}

impl DeviceCodeProvider {
    /// Create a provider whose HTTP requests time out after `http_timeout`.
    ///
    /// # Errors
    /// Returns `AuthError::Http` if the HTTP client cannot be built.
    pub fn new(prompt: Arc<dyn PromptSink>, http_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Http {
                endpoint: "client setup".to_string(),
                source: e,
            })?;

        Ok(Self { client, prompt })
    }

    async fn post_form<T>(&self, url: &Url, form: &[(&'static str, String)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let http_err = |e| AuthError::Http {
            endpoint: url.to_string(),
            source: e,
        };

        // Error bodies (400 authorization_pending and friends) are JSON too.
        let resp = self
            .client
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(http_err)?;
        resp.json::<T>().await.map_err(http_err)
    }

    async fn request_device_code(
        &self,
        endpoints: &Endpoints,
        request: &TokenRequest,
    ) -> Result<DeviceCodeResponse> {
        let resp: serde_json::Value = self
            .post_form(&endpoints.device_code, &device_code_form(request))
            .await?;

        if let Some(error) = resp.get("error").and_then(|e| e.as_str()) {
            let description = resp
                .get("error_description")
                .and_then(|d| d.as_str())
                .unwrap_or_default();
            return Err(AuthError::AuthenticationFailed(format!(
                "device code request rejected: {error} {description}"
            )));
        }

        serde_json::from_value(resp).map_err(|e| {
            AuthError::AuthenticationFailed(format!("unexpected device code response: {e}"))
        })
    }
}

#[async_trait]
impl TokenProvider for DeviceCodeProvider {
    async fn acquire_non_interactive(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        let endpoints = Endpoints::for_request(request)?;
        info!(endpoint = %endpoints.device_code, "requesting device code");

        let code = tokio::select! {
            _ = cancel.cancelled() => return Err(AuthError::Cancelled),
            code = self.request_device_code(&endpoints, request) => code?,
        };
        self.prompt.prompt(&code.instructions());

        let deadline = poll_deadline(Instant::now(), code.expires_in)?;
        let mut interval = poll_interval(code.interval);
        let form = token_form(request, &code.device_code);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }

            if Instant::now() >= deadline {
                return Err(AuthError::AuthenticationFailed(
                    "device code expired before sign-in completed".to_string(),
                ));
            }

            let resp: TokenResponse = tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                resp = self.post_form(&endpoints.token, &form) => resp?,
            };

            match PollOutcome::from(resp) {
                PollOutcome::Issued(token) => {
                    info!(expires_in_secs = ?token.expires_in, "device code sign-in completed");
                    return Ok(token);
                }
                PollOutcome::Pending => debug!("authorization pending"),
                PollOutcome::SlowDown => {
                    interval = slow_down(interval);
                    debug!(interval_secs = interval.as_secs(), "provider asked to slow down");
                }
                PollOutcome::Failed(reason) => {
                    return Err(AuthError::AuthenticationFailed(reason));
                }
            }
        }
    }
}
