//! `bwsm list`: list the secrets recorded in the state file.

use crate::cli::output;
use crate::cli::{state_path, Cli};
use crate::errors::Result;
use crate::state::StateFile;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let state = StateFile::load(&state_path(cli)?)?;
    output::print_resources_table(&state);
    Ok(())
}
