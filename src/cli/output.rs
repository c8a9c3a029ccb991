//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::provider::{Plan, PlannedAction};
use crate::secret::{ProjectRecord, SecretIdentifier, SecretRecord, SecretState};
use crate::state::StateFile;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

fn absent(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Print a plan as `~ attribute: before -> after` lines.
pub fn print_plan(name: &str, plan: &Plan) {
    let (marker, verb) = match plan.action {
        PlannedAction::Create => (style("+").green().bold(), "will be created"),
        PlannedAction::Update => (style("~").yellow().bold(), "will be updated in-place"),
        PlannedAction::NoOp => {
            info(&format!("{name}: no changes."));
            return;
        }
    };

    println!("{marker} {} {verb}", style(name).bold());
    for change in &plan.changes {
        println!(
            "    {marker} {}: {} {} {}",
            change.attribute,
            absent(&change.before),
            style("->").dim(),
            absent(&change.after),
        );
    }
}

fn value_cell(value: &str, show_value: bool) -> String {
    if show_value {
        value.to_string()
    } else {
        "(sensitive)".to_string()
    }
}

/// Print a managed secret's state as a two-column table.
pub fn print_secret_state(name: &str, state: &SecretState, show_value: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);

    let project = state.project_id.map(|p| p.to_string()).unwrap_or_default();
    let generator = state.generator;
    let rows: Vec<(&str, String)> = vec![
        ("resource", name.to_string()),
        ("id", state.id.to_string()),
        ("key", state.key.clone()),
        ("value", value_cell(&state.value, show_value)),
        ("note", state.note.clone()),
        ("project_id", project),
        ("organization_id", state.organization_id.to_string()),
        ("creation_date", state.creation_date.format(DATE_FORMAT).to_string()),
        ("revision_date", state.revision_date.format(DATE_FORMAT).to_string()),
        ("length", generator.length.to_string()),
        ("lowercase", format!("{} (min {})", generator.lowercase, generator.min_lowercase)),
        ("uppercase", format!("{} (min {})", generator.uppercase, generator.min_uppercase)),
        ("numbers", format!("{} (min {})", generator.numbers, generator.min_number)),
        ("special", format!("{} (min {})", generator.special, generator.min_special)),
        ("avoid_ambiguous", generator.avoid_ambiguous.to_string()),
    ];
    for (attribute, value) in rows {
        table.add_row(vec![attribute.to_string(), value]);
    }

    println!("{table}");
}

/// Print one secret read straight from the store.
pub fn print_secret_record(record: &SecretRecord, show_value: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);

    table.add_row(vec!["id".to_string(), record.id.to_string()]);
    table.add_row(vec!["key".to_string(), record.key.clone()]);
    table.add_row(vec!["value".to_string(), value_cell(&record.value, show_value)]);
    table.add_row(vec!["note".to_string(), record.note.clone()]);
    table.add_row(vec![
        "project_id".to_string(),
        record.project_id.map(|p| p.to_string()).unwrap_or_default(),
    ]);
    table.add_row(vec!["organization_id".to_string(), record.organization_id.to_string()]);
    table.add_row(vec![
        "creation_date".to_string(),
        record.creation_date.format(DATE_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "revision_date".to_string(),
        record.revision_date.format(DATE_FORMAT).to_string(),
    ]);

    println!("{table}");
}

/// Print a table of secret identifiers (ID, Key).
pub fn print_identifiers_table(secrets: &[SecretIdentifier]) {
    if secrets.is_empty() {
        info("The machine account cannot see any secrets.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Key"]);

    for s in secrets {
        table.add_row(vec![s.id.to_string(), s.key.clone()]);
    }

    println!("{table}");
}

/// Print a table of projects (ID, Name, Created, Updated).
pub fn print_projects_table(projects: &[ProjectRecord]) {
    if projects.is_empty() {
        info("The machine account cannot see any projects.");
        tip("Run `bwsm project create <NAME>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Created", "Updated"]);

    for p in projects {
        table.add_row(vec![
            p.id.to_string(),
            p.name.clone(),
            p.creation_date.format(DATE_FORMAT).to_string(),
            p.revision_date.format(DATE_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the resources recorded in a state file (Name, ID, Key, Updated).
pub fn print_resources_table(state: &StateFile) {
    if state.resources.is_empty() {
        info("No managed secrets yet.");
        tip("Run `bwsm apply <NAME> --key <KEY>` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "ID", "Key", "Updated"]);

    for (name, s) in &state.resources {
        table.add_row(vec![
            name.clone(),
            s.id.to_string(),
            s.key.clone(),
            s.revision_date.format(DATE_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}
