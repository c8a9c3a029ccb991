//! `bwsm projects`: list every project the machine account can access.

use crate::cli::output;
use crate::cli::{configure, Cli};
use crate::errors::Result;

/// Execute the `projects` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let projects = configure(cli)?.projects_data_source()?.read()?;
    output::print_projects_table(&projects);
    Ok(())
}
