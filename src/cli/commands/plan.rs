//! `bwsm plan`: show what `apply` would change for one secret.
//!
//! The prior state is refreshed from the store first, so a secret deleted
//! outside of bwsm plans a re-create and a value rotated outside of bwsm
//! plans nothing. The state file is not written.

use crate::cli::output;
use crate::cli::{configure, desired_state, state_path, Cli, SecretArgs};
use crate::errors::Result;
use crate::provider::Plan;
use crate::state::StateFile;

/// Execute the `plan` command.
pub fn execute(cli: &Cli, name: &str, args: &SecretArgs) -> Result<()> {
    let desired = desired_state(args)?;
    desired.validate()?;
    let state = StateFile::load(&state_path(cli)?)?;

    let plan = match state.get(name) {
        Some(prior) => match configure(cli)?.secret_resource()?.read(prior)? {
            Some(current) => Plan::diff(&desired, &current),
            None => {
                output::warning(&format!("'{name}' no longer exists in the store."));
                Plan::create(&desired)
            }
        },
        None => Plan::create(&desired),
    };

    output::print_plan(name, &plan);
    if !plan.is_noop() {
        output::tip(&format!(
            "Run `bwsm apply {name}` with the same arguments to make these changes."
        ));
    }
    Ok(())
}
