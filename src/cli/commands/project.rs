//! `bwsm project`: show, create, rename or delete a single project.
//!
//! Usage:
//!   bwsm project create backend
//!   bwsm project rename <ID> backend-prod
//!   bwsm project delete <ID> --force

use uuid::Uuid;

use crate::cli::output;
use crate::cli::{configure, confirm, Cli, ProjectAction};
use crate::errors::{ProviderError, Result};

/// Execute the `project` command.
pub fn execute(cli: &Cli, action: &ProjectAction) -> Result<()> {
    let provider = configure(cli)?;

    match action {
        ProjectAction::Show { id } => {
            let project = provider.project_data_source()?.read(id)?;
            output::print_projects_table(std::slice::from_ref(&project));
        }
        ProjectAction::Create { name } => {
            let name = non_empty_name(name)?;
            let organization_id = provider.config().organization_id;
            let project = provider.connect()?.create_project(organization_id, name)?;
            output::success(&format!("Created project '{}' ({}).", project.name, project.id));
        }
        ProjectAction::Rename { id, name } => {
            let id = parse_id(id)?;
            let name = non_empty_name(name)?;
            let organization_id = provider.config().organization_id;
            let project = provider
                .connect()?
                .update_project(id, organization_id, name)?;
            output::success(&format!("Renamed project {} to '{}'.", project.id, project.name));
        }
        ProjectAction::Delete { id, force } => {
            let id = parse_id(id)?;
            let store = provider.connect()?;
            let project = store.get_project(id)?;

            if !force && !confirm(&format!("Delete project '{}' ({id})?", project.name))? {
                output::info("Cancelled.");
                return Ok(());
            }

            let outcomes = store.delete_projects(&[id])?;
            if let Some(error) = outcomes.into_iter().find_map(|o| o.error) {
                return Err(ProviderError::store("delete project", error));
            }
            output::success(&format!("Deleted project '{}'.", project.name));
        }
    }

    Ok(())
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ProviderError::InvalidUuid {
        attribute: "id",
        value: raw.to_string(),
    })
}

fn non_empty_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProviderError::InvalidAttribute {
            attribute: "name",
            reason: "project name must not be empty".into(),
        });
    }
    Ok(name)
}
