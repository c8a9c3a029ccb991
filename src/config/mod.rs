pub mod provider;
pub mod settings;

pub use provider::{ProviderConfig, ProviderSettings};
pub use settings::Settings;
