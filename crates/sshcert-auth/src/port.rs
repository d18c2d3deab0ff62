// ABOUTME: Loopback port selection for the interactive sign-in redirect.
// ABOUTME: Tries sequential ports with bind-and-release until one is free, within a fixed bound.

use crate::config::RedirectConfig;
use crate::environment::parse_url;
use crate::error::{AuthError, Result};
use crate::provider::PromptSink;
use std::io;
use std::net::{Ipv4Addr, TcpListener};
use tracing::debug;
use url::Url;

/// Capability to check whether a loopback port can be claimed.
///
/// A successful bind must release the port before returning.
pub trait PortBinder: Send + Sync {
    fn try_bind(&self, port: u16) -> io::Result<()>;
}

/// Checks a port by binding a real listener on 127.0.0.1 and dropping it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackBinder;

impl PortBinder for LoopbackBinder {
    fn try_bind(&self, port: u16) -> io::Result<()> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))?;
        drop(listener);
        Ok(())
    }
}

/// Find the first free port starting at `redirect.base_port`.
///
/// Each taken port is reported to `prompt` before moving on. At most
/// `redirect.max_attempts` ports are tried, never past `u16::MAX`.
///
/// # Errors
/// Returns `AuthError::NoAvailablePort` if every candidate is taken.
pub fn select_redirect_port(
    binder: &dyn PortBinder,
    redirect: &RedirectConfig,
    prompt: &dyn PromptSink,
) -> Result<u16> {
    let first = redirect.base_port;
    let mut last = first;

    for port in candidate_ports(redirect) {
        last = port;
        match binder.try_bind(port) {
            Ok(()) => {
                debug!(port, "selected redirect port");
                return Ok(port);
            }
            Err(e) => {
                debug!(port, error = %e, "redirect port taken");
                prompt.prompt(&format!(
                    "Port {port} is taken with exception '{e}'; trying to connect to the next port."
                ));
            }
        }
    }

    Err(AuthError::NoAvailablePort { first, last })
}

fn candidate_ports(redirect: &RedirectConfig) -> impl Iterator<Item = u16> {
    let base = redirect.base_port;
    (0..redirect.max_attempts).map_while(move |i| base.checked_add(i))
}

/// Redirect URL for a selected loopback port.
pub fn redirect_uri(port: u16) -> Result<Url> {
    parse_url(&format!("http://localhost:{port}"))
}
