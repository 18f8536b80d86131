//! Hidden terminal input for master and credential passwords

use vault_core::error::{Result, VaultError};
use vault_core::{PasswordPrompt, SecretString};

/// Read a line from the terminal without echoing it
pub fn read_secret(prompt: &str) -> Result<SecretString> {
    let value = rpassword::prompt_password(prompt)?;
    Ok(SecretString::new(value))
}

/// Master password prompt backed by the terminal
///
/// A password supplied up front (from `PASSVAULT_MASTER_PASSWORD`) is used
/// once instead of prompting.
pub struct TerminalPrompt {
    preset: Option<SecretString>,
}

impl TerminalPrompt {
    pub fn new(preset: Option<String>) -> Self {
        Self {
            preset: preset.map(SecretString::new),
        }
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn new_master_password(&mut self) -> Result<SecretString> {
        if let Some(password) = self.preset.take() {
            return Ok(password);
        }

        let password = read_secret("Create a master password: ")?;
        let confirmation = read_secret("Confirm master password: ")?;
        if password.expose() != confirmation.expose() {
            return Err(VaultError::InvalidArgument(
                "Master passwords do not match".to_string(),
            ));
        }
        Ok(password)
    }

    fn master_password(&mut self) -> Result<SecretString> {
        match self.preset.take() {
            Some(password) => Ok(password),
            None => read_secret("Enter master password: "),
        }
    }
}
