//! `bwsm secrets`: list every secret the machine account can access.

use crate::cli::output;
use crate::cli::{configure, Cli};
use crate::errors::Result;

/// Execute the `secrets` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let secrets = configure(cli)?.list_secrets_data_source()?.read()?;
    output::print_identifiers_table(&secrets);
    Ok(())
}
