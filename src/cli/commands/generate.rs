//! `bwsm generate`: print a generated value without storing it.

use crate::cli::GeneratorArgs;
use crate::errors::Result;
use crate::secret::{generator, GeneratorConfig};

/// Execute the `generate` command.
pub fn execute(args: &GeneratorArgs) -> Result<()> {
    let config = GeneratorConfig::from(args);
    config.validate()?;
    let value = generator::generate(&config)?;
    println!("{value}");
    Ok(())
}
