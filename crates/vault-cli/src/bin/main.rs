//! passvault - local password vault
//!
//! On first run the master password is set and the program exits; later runs
//! ask for it before any stored credential can be read or changed.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use vault_cli::commands::{self, generate};
use vault_cli::exit;
use vault_cli::prompt::read_secret;
use vault_cli::{master_password_from_env, Args, Command, Menu, TerminalPrompt};
use vault_core::{SecretString, Startup, Vault};

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for passwords and prompts
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let result = run(args);
    ExitCode::from(exit::report(&result, &mut io::stderr()))
}

fn run(args: Args) -> Result<()> {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => Vault::default_dir()?,
    };
    let vault = Vault::open(&data_dir)
        .with_context(|| format!("Failed to open vault at {}", data_dir.display()))?;
    debug!("Using data directory {:?}", vault.data_dir());

    // Generating a password needs no vault access
    if let Some(Command::Generate { generation }) = &args.command {
        println!("{}", generate(generation, vault.settings())?);
        return Ok(());
    }

    let mut prompt = TerminalPrompt::new(master_password_from_env());
    let session = match vault.start(&mut prompt)? {
        Startup::Established => {
            println!("Master password set. Restart the application to log in.");
            return Ok(());
        }
        Startup::Unlocked(session) => session,
    };

    match args.command {
        None => {
            let stdin = io::stdin();
            Menu::new(&session, vault.settings(), stdin.lock(), io::stdout())
                .hide_secrets(true)
                .run()
        }
        Some(command) => {
            let mut read_typed = |prompt: &str| -> Result<SecretString> { Ok(read_secret(prompt)?) };
            commands::execute(
                command,
                &session,
                vault.settings(),
                &mut read_typed,
                &mut io::stdout(),
            )
        }
    }
}
