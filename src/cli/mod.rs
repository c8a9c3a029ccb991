//! Command-line interface: the clap parser and the helpers shared by commands.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use uuid::Uuid;

use crate::config::{ProviderSettings, Settings};
use crate::errors::{ProviderError, Result};
use crate::provider::{ConfiguredProvider, Provider};
use crate::secret::generator::DEFAULT_LENGTH;
use crate::secret::{DesiredState, GeneratorConfig};
use crate::store::{BitwardenStoreFactory, LocalStoreFactory, StoreFactory};

/// bwsm: declarative lifecycle management for Bitwarden Secrets Manager.
#[derive(Parser)]
#[command(
    name = "bwsm",
    about = "Declarative lifecycle management for Bitwarden Secrets Manager secrets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Secrets Manager API URL (falls back to BW_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Identity service URL (falls back to BW_IDENTITY_API_URL)
    #[arg(long, global = true)]
    pub identity_url: Option<String>,

    /// Machine account access token (falls back to BW_ACCESS_TOKEN)
    #[arg(long, global = true, hide = true)]
    pub access_token: Option<String>,

    /// Organization ID (falls back to BW_ORGANIZATION_ID)
    #[arg(long, global = true)]
    pub organization_id: Option<String>,

    /// State file (default: .bwsm/state.json)
    #[arg(long, global = true, env = "BWSM_STATE_FILE")]
    pub state_file: Option<String>,

    /// Use a local JSON file as the secret store instead of the API
    #[arg(long, global = true, env = "BWSM_LOCAL_STORE")]
    pub local_store: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show what `apply` would change for a secret
    Plan {
        /// Resource name in the state file
        name: String,
        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Create or update a secret
    Apply {
        /// Resource name in the state file
        name: String,
        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Re-read managed secrets from the store
    Refresh {
        /// Only refresh this resource
        name: Option<String>,
    },

    /// Show the recorded state of a managed secret
    Show {
        /// Resource name
        name: String,
        /// Print the secret value
        #[arg(long)]
        show_value: bool,
    },

    /// Delete a managed secret from the store and the state file
    Destroy {
        /// Resource name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Bring an existing secret under management
    Import {
        /// Resource name to record it under
        name: String,
        /// Secret ID
        id: String,
    },

    /// List managed secrets recorded in the state file
    List,

    /// List every secret the machine account can access
    Secrets,

    /// Read one secret by ID
    Secret {
        /// Secret ID
        id: String,
        /// Print the secret value
        #[arg(long)]
        show_value: bool,
    },

    /// List every project the machine account can access
    Projects,

    /// Manage a single project
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Generate a value without storing it
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Print the provider schema as JSON
    Schema,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Project subcommands.
#[derive(clap::Subcommand)]
pub enum ProjectAction {
    /// Show one project
    Show {
        /// Project ID
        id: String,
    },

    /// Create a project
    Create {
        /// Project name
        name: String,
    },

    /// Rename a project
    Rename {
        /// Project ID
        id: String,
        /// New name
        name: String,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Desired configuration of one secret resource.
#[derive(clap::Args, Clone)]
pub struct SecretArgs {
    /// Secret key ("name" in Secrets Manager)
    #[arg(long)]
    pub key: String,

    /// Explicit value ("-" reads stdin); omit to generate one
    #[arg(long)]
    pub value: Option<String>,

    /// Note attached to the secret
    #[arg(long)]
    pub note: Option<String>,

    /// Project the secret belongs to
    #[arg(long)]
    pub project_id: Option<String>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Value generator constraints.
#[derive(clap::Args, Clone, Debug)]
pub struct GeneratorArgs {
    /// Total length of a generated value
    #[arg(long, default_value_t = DEFAULT_LENGTH)]
    pub length: u32,

    /// Leave out I, O, l, 0 and 1
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub avoid_ambiguous: bool,

    /// Include a-z
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub lowercase: bool,

    #[arg(long, default_value_t = 1)]
    pub min_lowercase: u32,

    /// Include A-Z
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub uppercase: bool,

    #[arg(long, default_value_t = 1)]
    pub min_uppercase: u32,

    /// Include 0-9
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub numbers: bool,

    #[arg(long, default_value_t = 1)]
    pub min_number: u32,

    /// Include !@#$%^&*
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub special: bool,

    #[arg(long, default_value_t = 1)]
    pub min_special: u32,
}

impl From<&GeneratorArgs> for GeneratorConfig {
    fn from(args: &GeneratorArgs) -> Self {
        GeneratorConfig {
            length: args.length,
            avoid_ambiguous: args.avoid_ambiguous,
            lowercase: args.lowercase,
            min_lowercase: args.min_lowercase,
            uppercase: args.uppercase,
            min_uppercase: args.min_uppercase,
            numbers: args.numbers,
            min_number: args.min_number,
            special: args.special,
            min_special: args.min_special,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.bwsm.toml` from the current directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Path to the state file: `--state-file`, then the settings file.
pub fn state_path(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.state_file {
        Some(path) => cwd.join(path),
        None => load_settings()?.state_path(&cwd),
    })
}

/// Explicit provider attributes: command-line flags, then the settings file.
pub fn provider_settings(cli: &Cli, settings: &Settings) -> ProviderSettings {
    ProviderSettings {
        api_url: cli.api_url.clone().or_else(|| settings.api_url.clone()),
        identity_url: cli
            .identity_url
            .clone()
            .or_else(|| settings.identity_url.clone()),
        access_token: cli.access_token.clone(),
        organization_id: cli
            .organization_id
            .clone()
            .or_else(|| settings.organization_id.clone()),
    }
}

/// Build and configure the provider for this invocation.
pub fn configure(cli: &Cli) -> Result<ConfiguredProvider> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let local_store = cli
        .local_store
        .as_ref()
        .map(|p| cwd.join(p))
        .or_else(|| settings.local_store_path(&cwd));

    let factory: Arc<dyn StoreFactory> = match local_store {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using local store");
            Arc::new(LocalStoreFactory::new(path))
        }
        None => Arc::new(BitwardenStoreFactory::new(settings.request_timeout())),
    };

    Provider::new(env!("CARGO_PKG_VERSION"), factory).configure(&provider_settings(cli, &settings))
}

/// Translate command-line secret arguments into a desired state.
pub fn desired_state(args: &SecretArgs) -> Result<DesiredState> {
    let mut desired = DesiredState::new(args.key.clone())
        .with_generator(GeneratorConfig::from(&args.generator));

    if let Some(value) = &args.value {
        desired = desired.with_value(read_value(value)?);
    }
    if let Some(note) = &args.note {
        desired = desired.with_note(note.clone());
    }
    if let Some(project_id) = args.project_id.as_deref().filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(project_id).map_err(|_| ProviderError::InvalidUuid {
            attribute: "project_id",
            value: project_id.to_string(),
        })?;
        desired = desired.with_project_id(id);
    }

    Ok(desired.normalized())
}

/// Resolve a `--value` argument; "-" reads stdin.
fn read_value(value: &str) -> Result<String> {
    if value != "-" {
        output::warning("A value passed on the command line may end up in shell history.");
        return Ok(value.to_string());
    }
    if io::stdin().is_terminal() {
        return dialoguer::Password::new()
            .with_prompt("Enter secret value")
            .interact()
            .map_err(|e| ProviderError::CommandFailed(format!("input prompt: {e}")));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf.trim_end().to_string())
}

/// Ask before a destructive action. Returns `false` if the user declined.
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ProviderError::CommandFailed(format!("confirm prompt: {e}")))
}
