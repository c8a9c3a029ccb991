//! One module per subcommand, each exposing an `execute` function.

pub mod apply;
pub mod completions;
pub mod destroy;
pub mod generate;
pub mod import_cmd;
pub mod list;
pub mod plan;
pub mod project;
pub mod projects;
pub mod refresh;
pub mod schema;
pub mod secret;
pub mod secrets;
pub mod show;
