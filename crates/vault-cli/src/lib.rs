//! # vault-cli
//!
//! Terminal front end for passvault: master password prompts, the
//! interactive menu, and one-shot subcommands over `vault-core`.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod menu;
pub mod prompt;

pub use cli::{master_password_from_env, Args, Command, GenerationArgs};
pub use menu::Menu;
pub use prompt::TerminalPrompt;
