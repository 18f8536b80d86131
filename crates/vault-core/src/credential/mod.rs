//! Credential management for website logins

mod manager;
mod types;

pub use manager::CredentialManager;
pub use types::*;
