//! `bwsm refresh`: re-read managed secrets from the store.
//!
//! Secrets that no longer exist are dropped from the state file.

use crate::cli::output;
use crate::cli::{configure, state_path, Cli};
use crate::errors::Result;
use crate::state::StateFile;

/// Execute the `refresh` command.
pub fn execute(cli: &Cli, name: Option<&str>) -> Result<()> {
    let path = state_path(cli)?;
    let mut state = StateFile::load(&path)?;

    let names: Vec<String> = match name {
        Some(name) => {
            state.require(name)?;
            vec![name.to_string()]
        }
        None => state.resources.keys().cloned().collect(),
    };
    if names.is_empty() {
        output::info("No managed secrets to refresh.");
        return Ok(());
    }

    let resource = configure(cli)?.secret_resource()?;
    let mut removed = 0;
    for name in &names {
        let prior = state.require(name)?.clone();
        match resource.read(&prior)? {
            Some(current) => state.insert(name.as_str(), current),
            None => {
                state.remove(name);
                removed += 1;
                output::warning(&format!("'{name}' no longer exists, removed from state."));
            }
        }
    }
    state.save(&path)?;

    output::success(&format!(
        "Refreshed {} secret(s), {removed} removed.",
        names.len() - removed
    ));
    Ok(())
}
