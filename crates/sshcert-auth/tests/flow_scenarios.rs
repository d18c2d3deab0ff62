// ABOUTME: End-to-end scenarios for the certificate flow with scripted providers.
// ABOUTME: Covers port exhaustion fallback, cancellation during sign-in and the bound token request.

use async_trait::async_trait;
use sshcert_auth::{
    AccessToken, Account, AuthError, CertificateAuthenticationFlow, Environment, LoopbackBinder,
    PortBinder, PromptSink, RedirectConfig, Result, TokenProvider, TokenRequest, FALLBACK_MESSAGE,
};
use sshcert_ssh::{RsaPublicKey, SshCertificateAuthParameters};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

const TEST_PUBLIC_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQCvAtoiFV59d8kaHUh82Uy5bso5g6/XWQku6++zfWNon5mpy8SLWT2QKiTUeWuM86wOmBhcFbO/8Powov8bWzZRkgNKnwyPOL3Pp3uyq9maGbYcGeOS757hZgdmJMuly/o7tGnJu0w2Efp8eZdGmz1FZOi4p+s5+EWAL8jOCFwXEuZm+mjsCIrJVlfZ6ArvunQ/NS+2ld4c8xsxH/smAJHw34wXI143dytjOmQLN8AbGhD927CnNLcFdJ2edqTBC5U7Rw/hy5hac9xVt/McK00bqAVOhzxIcxk6JiyaMSaCgaILw1s6IiRiJcF/vCH2FYIhzRFPbOtYFBc1SH73rMz3 user@host";

/// Provider whose interactive path either fails, succeeds or hangs.
#[derive(Default)]
struct ScriptedProvider {
    interactive_hangs: bool,
    interactive_calls: AtomicUsize,
    non_interactive_calls: AtomicUsize,
    redirects: Mutex<Vec<Url>>,
    requests: Mutex<Vec<TokenRequest>>,
    started: Arc<Notify>,
}

#[async_trait]
impl TokenProvider for ScriptedProvider {
    async fn acquire_interactive(
        &self,
        request: &TokenRequest,
        redirect_uri: &Url,
        _cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        self.interactive_calls.fetch_add(1, Ordering::SeqCst);
        self.redirects.lock().expect("lock").push(redirect_uri.clone());
        self.requests.lock().expect("lock").push(request.clone());
        self.started.notify_one();

        if self.interactive_hangs {
            std::future::pending().await
        } else {
            Ok(AccessToken::new("interactive-token"))
        }
    }

    async fn acquire_non_interactive(
        &self,
        request: &TokenRequest,
        _cancel: &CancellationToken,
    ) -> Result<AccessToken> {
        self.non_interactive_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("lock").push(request.clone());
        Ok(AccessToken::new("device-token"))
    }
}

/// Every port is reported as in use.
#[derive(Default)]
struct AllTaken {
    attempts: AtomicUsize,
}

impl PortBinder for AllTaken {
    fn try_bind(&self, _port: u16) -> io::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::AddrInUse, "address in use"))
    }
}

fn params() -> SshCertificateAuthParameters {
    let key = RsaPublicKey::parse(TEST_PUBLIC_KEY).expect("test key should parse");
    SshCertificateAuthParameters::from_public_key(&key)
}

fn recording_prompt() -> (Arc<Mutex<Vec<String>>>, Arc<dyn PromptSink>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = seen.clone();
        move |m: &str| seen.lock().expect("lock").push(m.to_string())
    };
    (seen, Arc::new(sink))
}

#[tokio::test]
async fn test_port_exhaustion_falls_back_to_device_code() {
    let provider = Arc::new(ScriptedProvider::default());
    let binder = Arc::new(AllTaken::default());
    let (prompts, sink) = recording_prompt();

    let credential = CertificateAuthenticationFlow::new(provider.clone(), sink)
        .with_port_binder(binder.clone())
        .issue_certificate(
            &params(),
            &Account::default(),
            &Environment::azure_cloud(),
            "contoso",
            true,
            &CancellationToken::new(),
        )
        .await
        .expect("fallback should issue a certificate");

    assert_eq!(
        credential.certificate(),
        "ssh-rsa-cert-v01@openssh.com device-token"
    );
    assert_eq!(binder.attempts.load(Ordering::SeqCst), 600);
    assert_eq!(provider.interactive_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.non_interactive_calls.load(Ordering::SeqCst), 1);

    let prompts = prompts.lock().expect("lock");
    assert_eq!(prompts.len(), 601, "one message per taken port plus fallback");
    assert!(prompts[0].starts_with("Port 8400 is taken with exception"));
    assert!(prompts[599].starts_with("Port 8999 is taken"));
    assert_eq!(prompts[600], FALLBACK_MESSAGE);
}

#[tokio::test]
async fn test_cancel_during_interactive_sign_in() {
    let provider = Arc::new(ScriptedProvider {
        interactive_hangs: true,
        ..ScriptedProvider::default()
    });
    let (prompts, sink) = recording_prompt();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        let started = provider.started.clone();
        tokio::spawn(async move {
            started.notified().await;
            cancel.cancel();
        })
    };

    let err = CertificateAuthenticationFlow::new(provider.clone(), sink)
        .with_port_binder(Arc::new(LoopbackBinder))
        .with_redirect(RedirectConfig {
            base_port: 48400,
            max_attempts: 600,
        })
        .issue_certificate(
            &params(),
            &Account::new("user@contoso.test"),
            &Environment::azure_cloud(),
            "contoso",
            true,
            &cancel,
        )
        .await
        .unwrap_err();

    canceller.await.expect("canceller should finish");

    assert!(matches!(err, AuthError::Cancelled));
    assert!(!err.is_recoverable());
    assert_eq!(provider.interactive_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        provider.non_interactive_calls.load(Ordering::SeqCst),
        0,
        "cancellation must not fall back"
    );
    assert!(!prompts
        .lock()
        .expect("lock")
        .iter()
        .any(|p| p == FALLBACK_MESSAGE));

    // The tried port was released before sign-in started.
    let port = provider.redirects.lock().expect("lock")[0]
        .port()
        .expect("redirect should carry a port");
    assert!((48400..49000).contains(&port));
    LoopbackBinder
        .try_bind(port)
        .expect("redirect port should be free after cancellation");
}

#[tokio::test]
async fn test_interactive_request_is_bound_to_key() {
    let provider = Arc::new(ScriptedProvider::default());
    let params = params();

    let credential = CertificateAuthenticationFlow::new(provider.clone(), Arc::new(|_: &str| {}))
        .with_port_binder(Arc::new(AllFree))
        .issue_certificate(
            &params,
            &Account::new("user@contoso.test"),
            &Environment::azure_us_government(),
            "72f988bf-86f1-41af-91ab-2d7cd011db47",
            true,
            &CancellationToken::new(),
        )
        .await
        .expect("should issue");

    assert_eq!(
        credential.certificate(),
        "ssh-rsa-cert-v01@openssh.com interactive-token"
    );

    let requests = provider.requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.authority.as_str(),
        "https://login.microsoftonline.us/72f988bf-86f1-41af-91ab-2d7cd011db47/"
    );
    assert_eq!(
        request.scopes,
        vec!["https://pasff.usgovcloudapi.net/CheckMyAccess/Linux/.default"]
    );
    assert_eq!(request.key_id, params.key_id());
    assert_eq!(request.jwk, params.jwk().expect("jwk should serialize"));
    assert!(request.jwk.starts_with(r#"{"kty":"RSA","n":""#));
    assert!(request.jwk.ends_with(r#"","e":"AQAB"}"#));

    let redirects = provider.redirects.lock().expect("lock");
    assert_eq!(redirects[0].as_str(), "http://localhost:8400/");
}

#[tokio::test]
async fn test_non_interactive_request_skips_ports() {
    let provider = Arc::new(ScriptedProvider::default());
    let binder = Arc::new(AllTaken::default());

    CertificateAuthenticationFlow::new(provider.clone(), Arc::new(|_: &str| {}))
        .with_port_binder(binder.clone())
        .issue_certificate(
            &params(),
            &Account::default(),
            &Environment::azure_cloud(),
            "",
            false,
            &CancellationToken::new(),
        )
        .await
        .expect("should issue");

    assert_eq!(binder.attempts.load(Ordering::SeqCst), 0);
    assert_eq!(provider.non_interactive_calls.load(Ordering::SeqCst), 1);
}

struct AllFree;

impl PortBinder for AllFree {
    fn try_bind(&self, _port: u16) -> io::Result<()> {
        Ok(())
    }
}
