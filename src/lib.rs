pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod provider;
pub mod secret;
pub mod state;
pub mod store;
