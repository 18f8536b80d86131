//! Command line arguments

use std::env;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use vault_core::CharsetFlags;

/// passvault - local password vault with a master password
#[derive(Parser, Debug)]
#[command(name = "passvault")]
#[command(version)]
#[command(about = "Local password vault: generate, encrypt, and store website passwords")]
#[command(after_help = "Set PASSVAULT_MASTER_PASSWORD to supply the master password without a prompt.")]
pub struct Args {
    /// Directory holding the master file, settings, and credential database
    #[arg(long, env = "PASSVAULT_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Environment variable holding the master password for scripted use
///
/// There is no command line flag for it, since argv is visible to other users
/// through the process list.
pub const MASTER_PASSWORD_ENV: &str = "PASSVAULT_MASTER_PASSWORD";

/// Master password from the environment, if set and non-empty
pub fn master_password_from_env() -> Option<String> {
    env::var(MASTER_PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a password and store it for a website login
    Add {
        website: String,
        username: String,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Type the password instead of generating one
        #[arg(long)]
        manual: bool,
    },

    /// Show every stored login with its decrypted password
    List,

    /// Replace the password of a stored login
    Update {
        website: String,
        username: String,

        /// Generate the new password instead of typing it
        #[arg(long)]
        generate: bool,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Remove a stored login
    Delete { website: String, username: String },

    /// Print a generated password without opening the vault
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Password generation options; unset values fall back to settings
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Password length (6-32)
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Leave out uppercase letters
    #[arg(long)]
    pub no_uppercase: bool,

    /// Leave out lowercase letters
    #[arg(long)]
    pub no_lowercase: bool,

    /// Leave out digits
    #[arg(long)]
    pub no_numbers: bool,

    /// Leave out symbols
    #[arg(long)]
    pub no_symbols: bool,
}

impl GenerationArgs {
    pub fn length_or(&self, default: usize) -> usize {
        self.length.unwrap_or(default)
    }

    /// Apply the `--no-*` switches on top of the configured defaults
    pub fn charsets(&self, defaults: CharsetFlags) -> CharsetFlags {
        CharsetFlags {
            uppercase: defaults.uppercase && !self.no_uppercase,
            lowercase: defaults.lowercase && !self.no_lowercase,
            numbers: defaults.numbers && !self.no_numbers,
            symbols: defaults.symbols && !self.no_symbols,
        }
    }
}
