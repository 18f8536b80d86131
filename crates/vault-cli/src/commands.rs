//! Subcommand handlers

use std::io::Write;

use anyhow::{Context, Result};
use vault_core::generator::generate_password;
use vault_core::{DecryptedCredential, SecretString, Settings, VaultSession};

use crate::cli::{Command, GenerationArgs};

pub const UPDATED: &str = "Password updated successfully!";
pub const DELETED: &str = "Password deleted successfully!";
pub const NOT_FOUND: &str = "No matching entry found.";

/// Generate a password from CLI options, falling back to configured defaults
pub fn generate(generation: &GenerationArgs, settings: &Settings) -> Result<String> {
    let length = generation.length_or(settings.default_password_length);
    let charsets = generation.charsets(settings.default_charset);
    Ok(generate_password(length, &charsets)?)
}

/// Run a subcommand against an unlocked session
///
/// `read_secret` supplies typed passwords (`add --manual`, `update`).
pub fn execute(
    command: Command,
    session: &VaultSession,
    settings: &Settings,
    read_secret: &mut dyn FnMut(&str) -> Result<SecretString>,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Add {
            website,
            username,
            generation,
            manual,
        } => {
            let password = if manual {
                read_secret("Enter password: ")?
            } else {
                SecretString::new(generate(&generation, settings)?)
            };

            session
                .credentials()
                .add(&website, &username, password.expose())
                .with_context(|| format!("Failed to add {} for {}", username, website))?;

            if !manual {
                writeln!(out, "Generated password: {}", password.expose())?;
            }
            writeln!(out, "Password saved successfully!")?;
        }

        Command::List => {
            let credentials = session.credentials().list_decrypted()?;
            print_credentials(out, &credentials)?;
        }

        Command::Update {
            website,
            username,
            generate: generated,
            generation,
        } => {
            let password = if generated {
                SecretString::new(generate(&generation, settings)?)
            } else {
                read_secret("Enter new password: ")?
            };

            let changed = session
                .credentials()
                .update_password(&website, &username, password.expose())?;
            if generated && changed > 0 {
                writeln!(out, "Generated password: {}", password.expose())?;
            }
            report_update(out, changed)?;
        }

        Command::Delete { website, username } => {
            let removed = session.credentials().delete(&website, &username)?;
            report_delete(out, removed)?;
        }

        Command::Generate { generation } => {
            writeln!(out, "{}", generate(&generation, settings)?)?;
        }
    }

    Ok(())
}

pub fn print_credentials(
    out: &mut (impl Write + ?Sized),
    credentials: &[DecryptedCredential],
) -> std::io::Result<()> {
    if credentials.is_empty() {
        return writeln!(out, "No passwords stored.");
    }

    for credential in credentials {
        writeln!(
            out,
            "Website: {}, Username: {}, Password: {}",
            credential.website(),
            credential.username(),
            credential.expose()
        )?;
    }
    Ok(())
}

pub fn report_update(out: &mut (impl Write + ?Sized), changed: usize) -> std::io::Result<()> {
    writeln!(out, "{}", if changed > 0 { UPDATED } else { NOT_FOUND })
}

pub fn report_delete(out: &mut (impl Write + ?Sized), removed: usize) -> std::io::Result<()> {
    writeln!(out, "{}", if removed > 0 { DELETED } else { NOT_FOUND })
}
