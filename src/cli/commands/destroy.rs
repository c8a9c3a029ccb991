//! `bwsm destroy`: delete a managed secret from the store and the state.
//!
//! The secret is refreshed first; one that is already gone is only dropped
//! from the state file.

use crate::cli::output;
use crate::cli::{configure, confirm, state_path, Cli};
use crate::errors::Result;
use crate::state::StateFile;

/// Execute the `destroy` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let path = state_path(cli)?;
    let mut state = StateFile::load(&path)?;
    let secret = state.require(name)?.clone();

    if !force && !confirm(&format!("Delete secret '{}' ({})?", secret.key, secret.id))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let resource = configure(cli)?.secret_resource()?;
    match resource.read(&secret)? {
        Some(current) => resource.delete(&current)?,
        None => output::warning(&format!(
            "'{name}' no longer exists in the store, removing it from state only."
        )),
    }
    state.remove(name);
    state.save(&path)?;

    output::success(&format!("Destroyed '{name}'."));
    Ok(())
}
