//! `bwsm apply`: create or update one secret and record it in state.

use crate::cli::output;
use crate::cli::{configure, desired_state, state_path, Cli, SecretArgs};
use crate::errors::Result;
use crate::secret::ValueSource;
use crate::state::StateFile;

/// Execute the `apply` command.
pub fn execute(cli: &Cli, name: &str, args: &SecretArgs) -> Result<()> {
    let desired = desired_state(args)?;
    desired.validate()?;

    let path = state_path(cli)?;
    let mut state = StateFile::load(&path)?;
    let resource = configure(cli)?.secret_resource()?;

    let prior = match state.get(name) {
        Some(prior) => {
            let current = resource.read(prior)?;
            if current.is_none() {
                output::warning(&format!("'{name}' no longer exists in the store, re-creating."));
            }
            current
        }
        None => None,
    };

    let applied = resource.apply(&desired, prior.as_ref())?;
    output::print_plan(name, &applied.plan);

    state.insert(name, applied.state.clone());
    state.save(&path)?;

    if let Some(source) = applied.value_source {
        let how = match source {
            ValueSource::Explicit => "value set explicitly",
            ValueSource::Generated => "value generated",
            ValueSource::Preserved => "value kept",
        };
        output::success(&format!("Applied '{name}' (id {}, {how}).", applied.state.id));
    }
    Ok(())
}
