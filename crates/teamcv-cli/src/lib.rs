//! Command-line front end over a directory of JSON files

pub mod cli;
pub mod commands;
pub mod config;
pub mod storage;

pub use cli::{Cli, Commands, OnboardingCommands, TeamCommands};
pub use commands::{open_store, run};
pub use config::Config;
pub use storage::FileStorage;
