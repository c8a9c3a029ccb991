use clap::Parser;
use bwsm::cli::commands;
use bwsm::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    bwsm::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Plan {
            ref name,
            ref secret,
        } => commands::plan::execute(&cli, name, secret),
        Commands::Apply {
            ref name,
            ref secret,
        } => commands::apply::execute(&cli, name, secret),
        Commands::Refresh { ref name } => commands::refresh::execute(&cli, name.as_deref()),
        Commands::Show {
            ref name,
            show_value,
        } => commands::show::execute(&cli, name, show_value),
        Commands::Destroy { ref name, force } => commands::destroy::execute(&cli, name, force),
        Commands::Import { ref name, ref id } => commands::import_cmd::execute(&cli, name, id),
        Commands::List => commands::list::execute(&cli),
        Commands::Secrets => commands::secrets::execute(&cli),
        Commands::Secret {
            ref id,
            show_value,
        } => commands::secret::execute(&cli, id, show_value),
        Commands::Projects => commands::projects::execute(&cli),
        Commands::Project { ref action } => commands::project::execute(&cli, action),
        Commands::Generate { ref generator } => commands::generate::execute(generator),
        Commands::Schema => commands::schema::execute(),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        bwsm::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
