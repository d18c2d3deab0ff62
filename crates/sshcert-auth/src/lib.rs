// ABOUTME: SSH certificate issuance against an OAuth identity provider.
// ABOUTME: Environments, config, redirect port probing, device code provider and the issuance flow.

//! # sshcert-auth
//!
//! Requests short-lived SSH certificates bound to a local RSA key.
//!
//! The flow sends the key's JWK and key id with a token request. When
//! interactive sign-in is requested it first tries loopback ports from
//! 8400 for a redirect listener; if that fails for any recoverable reason it
//! falls back once to the non-interactive provider path.
//!
//! ## Example
//!
//! ```no_run
//! use sshcert_auth::{
//!     Account, CertificateAuthenticationFlow, Config, DeviceCodeProvider, StderrPrompt,
//! };
//! use sshcert_ssh::{RsaPublicKey, SshCertificateAuthParameters};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let environment = config.resolve_environment(&config.environment)?;
//! let key = RsaPublicKey::parse(&std::fs::read_to_string("id_rsa.pub")?)?;
//! let params = SshCertificateAuthParameters::from_public_key(&key);
//!
//! let prompt = Arc::new(StderrPrompt);
//! let provider = DeviceCodeProvider::new(prompt.clone(), config.device_code.http_timeout())?;
//! let flow = CertificateAuthenticationFlow::new(Arc::new(provider), prompt);
//!
//! let credential = flow
//!     .issue_certificate(
//!         &params,
//!         &Account::default(),
//!         &environment,
//!         "",
//!         false,
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{}", credential.certificate());
//! # Ok(())
//! # }
//! ```

mod config;
mod device_code;
mod environment;
mod error;
mod flow;
mod port;
mod provider;

pub use config::{Config, DeviceCodeConfig, RedirectConfig, DEFAULT_CLIENT_ID};
pub use device_code::DeviceCodeProvider;
pub use environment::{Account, Environment, DEFAULT_TENANT};
pub use error::{AuthError, Result};
pub use flow::{CertificateAuthenticationFlow, FALLBACK_MESSAGE};
pub use port::{redirect_uri, select_redirect_port, LoopbackBinder, PortBinder};
pub use provider::{AccessToken, PromptSink, StderrPrompt, TokenProvider, TokenRequest};
