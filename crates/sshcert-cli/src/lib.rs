// ABOUTME: Library half of the sshcert CLI: subcommands, key files and ssh_config rendering.
// ABOUTME: Kept separate from main.rs so the command logic can be tested directly.

mod commands;
pub mod files;
pub mod ssh_config;

pub use commands::{issue, run_cert, run_config, run_inspect, IssueOptions, MachineOptions};
