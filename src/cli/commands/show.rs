//! `bwsm show`: print the recorded state of a managed secret.

use crate::cli::output;
use crate::cli::{state_path, Cli};
use crate::errors::Result;
use crate::state::StateFile;

/// Execute the `show` command.
pub fn execute(cli: &Cli, name: &str, show_value: bool) -> Result<()> {
    let state = StateFile::load(&state_path(cli)?)?;
    let secret = state.require(name)?;
    output::print_secret_state(name, secret, show_value);
    Ok(())
}
