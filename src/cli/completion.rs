//! Shell completion generation for triplectl

use std::io;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use super::Cli;

/// Write a completion script for `shell` to stdout
pub fn generate_completion(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "triplectl", &mut io::stdout());
}
