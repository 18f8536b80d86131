//! Master password handling
//!
//! - `MasterSecret`: on-disk verifier record
//! - `MasterAuthenticator`: first-run setup and unlock checks

mod authenticator;
mod secret;

pub use authenticator::{AuthOutcome, MasterAuthenticator, PasswordPrompt};
pub use secret::MasterSecret;

/// Default master file name inside the data directory
pub const MASTER_FILE: &str = "master.hash";

#[cfg(test)]
pub(crate) use authenticator::tests::ScriptedPrompt;
