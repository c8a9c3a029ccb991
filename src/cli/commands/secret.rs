//! `bwsm secret`: read one secret by ID.

use crate::cli::output;
use crate::cli::{configure, Cli};
use crate::errors::Result;

/// Execute the `secret` command.
pub fn execute(cli: &Cli, id: &str, show_value: bool) -> Result<()> {
    let record = configure(cli)?.secret_data_source()?.read(id)?;
    output::print_secret_record(&record, show_value);
    Ok(())
}
