//! `bwsm completions`: generate shell completion scripts.
//!
//! Usage:
//!   bwsm completions bash > ~/.bash_completion.d/bwsm
//!   bwsm completions zsh
//!   bwsm completions fish

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{ProviderError, Result};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "bwsm", &mut io::stdout());
    Ok(())
}

fn parse_shell(name: &str) -> Result<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" | "ps" => Ok(Shell::PowerShell),
        "elvish" => Ok(Shell::Elvish),
        other => Err(ProviderError::CommandFailed(format!(
            "unknown shell '{other}', expected one of bash, zsh, fish, powershell, elvish"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shells_parse() {
        assert_eq!(parse_shell("bash").unwrap(), Shell::Bash);
        assert_eq!(parse_shell("fish").unwrap(), Shell::Fish);
        assert_eq!(parse_shell("ps").unwrap(), Shell::PowerShell);
    }

    #[test]
    fn shell_names_ignore_case() {
        assert_eq!(parse_shell("ZSH").unwrap(), Shell::Zsh);
    }

    #[test]
    fn unknown_shell_is_rejected() {
        assert!(matches!(parse_shell("csh"), Err(ProviderError::CommandFailed(_))));
    }
}
