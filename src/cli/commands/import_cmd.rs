//! `bwsm import`: bring an existing secret under management.
//!
//! The generator attributes are recorded at their defaults, so applying a
//! default configuration afterwards keeps the imported value.

use crate::cli::output;
use crate::cli::{configure, state_path, Cli};
use crate::errors::{ProviderError, Result};
use crate::state::StateFile;

/// Execute the `import` command.
pub fn execute(cli: &Cli, name: &str, id: &str) -> Result<()> {
    let path = state_path(cli)?;
    let mut state = StateFile::load(&path)?;
    if state.get(name).is_some() {
        return Err(ProviderError::CommandFailed(format!(
            "'{name}' is already managed, destroy it or pick another name"
        )));
    }

    let imported = configure(cli)?.secret_resource()?.import(id)?;
    let key = imported.key.clone();
    state.insert(name, imported);
    state.save(&path)?;

    output::success(&format!("Imported '{key}' as '{name}'."));
    Ok(())
}
