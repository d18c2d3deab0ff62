// ABOUTME: Entry point for the sshcert command-line tool.
// ABOUTME: Parses arguments, sets up logging and Ctrl-C cancellation, then dispatches.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sshcert_cli::{IssueOptions, MachineOptions};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "sshcert")]
#[command(about = "Issue short-lived SSH certificates for a local RSA key")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a certificate and write it next to the public key
    Cert {
        #[command(flatten)]
        issue: IssueArgs,
    },

    /// Request a certificate and print ssh_config entries for a machine
    Config {
        #[command(flatten)]
        issue: IssueArgs,

        /// Private key matching the public key
        #[arg(long)]
        private_key_file: PathBuf,

        /// Address of the target machine
        #[arg(long)]
        ip: String,

        /// Resource group of the target machine
        #[arg(long, short = 'g', requires = "name")]
        resource_group: Option<String>,

        /// Name of the target machine
        #[arg(long, short = 'n', requires = "resource_group")]
        name: Option<String>,
    },

    /// Show the key id, fingerprint and JWK of a public key
    Inspect {
        /// OpenSSH RSA public key
        #[arg(long, short = 'p')]
        public_key_file: PathBuf,
    },
}

#[derive(Args)]
struct IssueArgs {
    /// OpenSSH RSA public key
    #[arg(long, short = 'p')]
    public_key_file: PathBuf,

    /// Config file (defaults to ~/.config/sshcert/config.toml)
    #[arg(long, env = "SSHCERT_CONFIG")]
    config: Option<PathBuf>,

    /// Tenant to sign in to
    #[arg(long, short = 't')]
    tenant: Option<String>,

    /// Environment name, e.g. AzureCloud
    #[arg(long, short = 'e')]
    environment: Option<String>,

    /// Account to use as the sign-in hint
    #[arg(long, short = 'a')]
    account: Option<String>,

    /// Try browser sign-in before falling back to device code
    #[arg(long, short = 'i')]
    interactive: bool,
}

impl From<IssueArgs> for IssueOptions {
    fn from(args: IssueArgs) -> Self {
        Self {
            public_key_file: args.public_key_file,
            config_path: args.config,
            tenant: args.tenant,
            environment: args.environment,
            account: args.account,
            interactive: args.interactive,
        }
    }
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sshcert_log::init_for("sshcert", cli.verbose);

    let cancel = CancellationToken::new();

    match cli.command {
        Commands::Cert { issue } => {
            cancel_on_ctrl_c(cancel.clone());
            sshcert_cli::run_cert(issue.into(), cancel).await
        }
        Commands::Config {
            issue,
            private_key_file,
            ip,
            resource_group,
            name,
        } => {
            cancel_on_ctrl_c(cancel.clone());
            let machine = MachineOptions {
                ip,
                resource_group,
                name,
                private_key_file,
            };
            sshcert_cli::run_config(issue.into(), machine, cancel).await
        }
        Commands::Inspect { public_key_file } => sshcert_cli::run_inspect(&public_key_file),
    }
}
