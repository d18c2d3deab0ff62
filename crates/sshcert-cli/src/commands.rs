// ABOUTME: Subcommand implementations for the sshcert CLI.
// ABOUTME: Wires config, key parsing, the issuance flow and file output together.

use crate::files::{certificate_path_for, read_public_key, write_certificate};
use crate::ssh_config::SshConfigEntry;
use anyhow::{Context, Result};
use colored::Colorize;
use sshcert_auth::{
    Account, CertificateAuthenticationFlow, Config, DeviceCodeProvider, StderrPrompt,
};
use sshcert_ssh::SshCertificateAuthParameters;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Inputs shared by every command that requests a certificate.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    pub public_key_file: PathBuf,
    pub config_path: Option<PathBuf>,
    pub tenant: Option<String>,
    pub environment: Option<String>,
    pub account: Option<String>,
    pub interactive: bool,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from(path)?),
        None => Ok(Config::load()?),
    }
}

/// Request a certificate for the public key and write it next to the key.
///
/// Returns the path of the written `.cer` file.
pub async fn issue(opts: &IssueOptions, cancel: &CancellationToken) -> Result<PathBuf> {
    let config = load_config(opts.config_path.as_deref()).context("Failed to load config")?;
    let environment_name = opts.environment.as_deref().unwrap_or(&config.environment);
    let environment = config.resolve_environment(environment_name)?;

    let key = read_public_key(&opts.public_key_file)?;
    info!(key_id = %key.key_id(), fingerprint = %key.fingerprint(), "loaded public key");
    let params = SshCertificateAuthParameters::from_public_key(&key);

    let prompt = Arc::new(StderrPrompt);
    let provider = DeviceCodeProvider::new(prompt.clone(), config.device_code.http_timeout())?;
    let flow = CertificateAuthenticationFlow::new(Arc::new(provider), prompt)
        .with_redirect(config.redirect)
        .with_client_id(config.client_id.clone());

    let tenant = opts
        .tenant
        .clone()
        .or_else(|| config.tenant_id.clone())
        .unwrap_or_default();
    let account = opts
        .account
        .clone()
        .or_else(|| config.account.clone())
        .map(Account::new)
        .unwrap_or_default();

    let credential = flow
        .issue_certificate(
            &params,
            &account,
            &environment,
            &tenant,
            opts.interactive,
            cancel,
        )
        .await
        .context("Failed to obtain SSH certificate")?;

    let cert_path = certificate_path_for(&opts.public_key_file)?;
    write_certificate(&cert_path, &credential)?;
    debug!(path = %cert_path.display(), "wrote certificate");

    Ok(cert_path)
}

pub async fn run_cert(opts: IssueOptions, cancel: CancellationToken) -> Result<()> {
    let cert_path = issue(&opts, &cancel).await?;
    println!(
        "{} {}",
        "Generated SSH certificate".green().bold(),
        cert_path.display()
    );
    Ok(())
}

/// Target machine for `sshcert config`.
#[derive(Debug, Clone)]
pub struct MachineOptions {
    pub ip: String,
    pub resource_group: Option<String>,
    pub name: Option<String>,
    pub private_key_file: PathBuf,
}

pub async fn run_config(
    opts: IssueOptions,
    machine: MachineOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let cert_path = issue(&opts, &cancel).await?;
    let identity = std::path::absolute(&machine.private_key_file).with_context(|| {
        format!("Failed to resolve {}", machine.private_key_file.display())
    })?;

    let entries = SshConfigEntry::for_machine(
        &machine.ip,
        machine.resource_group.as_deref(),
        machine.name.as_deref(),
        &cert_path,
        &identity,
    );

    let rendered: Vec<String> = entries.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join("\n\n"));
    Ok(())
}

/// Print the request parameters derived from a public key.
pub fn run_inspect(public_key_file: &Path) -> Result<()> {
    let key = read_public_key(public_key_file)?;
    let params = SshCertificateAuthParameters::from_public_key(&key);

    println!("{}", "Public key".bold());
    println!("  Algorithm:   {}", key.algorithm());
    println!("  Key id:      {}", key.key_id());
    println!("  Fingerprint: {}", key.fingerprint().dimmed());
    println!("  Exponent:    {}", key.exponent());
    println!();
    println!("{}", "Certificate request".bold());
    println!("  Key type:    {}", params.key_type());
    println!("  JWK:         {}", params.jwk()?);
    Ok(())
}
