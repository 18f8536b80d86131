//! Interactive menu
//!
//! Line-oriented prompts over any `BufRead`/`Write` pair, so the whole flow
//! can be driven from a script in tests.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use vault_core::generator::{generate_password, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use vault_core::{CharsetFlags, SecretString, Settings, VaultError, VaultSession};

use crate::commands::{print_credentials, report_delete, report_update};
use crate::prompt::read_secret;

const MENU_PROMPT: &str =
    "\nWhat would you like to do? (update(u)/delete(d)/add(a)/view(v)/quit(q)): ";

pub struct Menu<'a, R, W> {
    session: &'a VaultSession,
    settings: &'a Settings,
    input: R,
    output: W,
    hide_secrets: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(session: &'a VaultSession, settings: &'a Settings, input: R, output: W) -> Self {
        Self {
            session,
            settings,
            input,
            output,
            hide_secrets: false,
        }
    }

    /// Read typed passwords from the terminal without echo
    pub fn hide_secrets(mut self, hide: bool) -> Self {
        self.hide_secrets = hide;
        self
    }

    /// Run until the user quits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.output, "{}", MENU_PROMPT)?;
            self.output.flush()?;

            let Some(choice) = self.next_line()? else {
                return Ok(());
            };

            let outcome = match choice.trim().to_lowercase().as_str() {
                "u" => self.update(),
                "d" => self.delete(),
                "a" => self.add(),
                "v" => self.view(),
                "q" => return Ok(()),
                _ => {
                    writeln!(self.output, "Invalid choice.")?;
                    continue;
                }
            };

            // Bad input and unreadable records abort only the current action
            if let Err(err) = outcome {
                match err.downcast_ref::<VaultError>() {
                    Some(VaultError::InvalidArgument(_) | VaultError::IntegrityError(_)) => {
                        writeln!(self.output, "Error: {}", err)?;
                    }
                    _ => return Err(err),
                }
            }
        }
    }

    fn update(&mut self) -> Result<()> {
        let website = self.ask("Enter website name: ")?;
        let username = self.ask("Enter username: ")?;
        let password = self.ask_secret("Enter new password: ")?;

        let changed = self
            .session
            .credentials()
            .update_password(&website, &username, password.expose())?;
        report_update(&mut self.output, changed)?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let website = self.ask("Enter website name: ")?;
        let username = self.ask("Enter username: ")?;

        let removed = self.session.credentials().delete(&website, &username)?;
        report_delete(&mut self.output, removed)?;
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let length = self.ask_length()?;
        let charsets = CharsetFlags {
            uppercase: self.confirm("Include uppercase letters? (y/n): ")?,
            lowercase: self.confirm("Include lowercase letters? (y/n): ")?,
            numbers: self.confirm("Include numbers? (y/n): ")?,
            symbols: self.confirm("Include symbols? (y/n): ")?,
        };
        let website = self.ask("Enter website name: ")?;
        let username = self.ask("Enter username: ")?;

        let password = SecretString::new(generate_password(length, &charsets)?);
        self.session
            .credentials()
            .add(&website, &username, password.expose())?;

        writeln!(self.output, "Generated password: {}", password.expose())?;
        writeln!(self.output, "Password saved successfully!")?;

        if self.confirm("\nWould you like to view all stored passwords? (y/n): ")? {
            self.view()?;
        }
        Ok(())
    }

    fn view(&mut self) -> Result<()> {
        let credentials = self.session.credentials().list_decrypted()?;
        print_credentials(&mut self.output, &credentials)?;
        Ok(())
    }

    fn ask_length(&mut self) -> Result<usize> {
        let prompt = format!(
            "Enter password length ({}-{}, default {}): ",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, self.settings.default_password_length
        );
        let mut answer = self.ask(&prompt)?;

        loop {
            if answer.is_empty() {
                return Ok(self.settings.default_password_length);
            }
            match answer.parse::<usize>() {
                Ok(length) if (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) => {
                    return Ok(length)
                }
                _ => {
                    writeln!(
                        self.output,
                        "Invalid input. Please enter a number between {} and {}.",
                        MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
                    )?;
                    answer = self.require_line()?.trim().to_string();
                }
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self.ask(prompt)?.eq_ignore_ascii_case("y"))
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self.ask_raw(prompt)?.trim().to_string())
    }

    /// Passwords keep surrounding whitespace and are wiped once dropped
    fn ask_secret(&mut self, prompt: &str) -> Result<SecretString> {
        if self.hide_secrets {
            Ok(read_secret(prompt)?)
        } else {
            Ok(SecretString::new(self.ask_raw(prompt)?))
        }
    }

    fn ask_raw(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        self.require_line()
    }

    fn require_line(&mut self) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => bail!("Input closed"),
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{DELETED, NOT_FOUND, UPDATED};
    use tempfile::TempDir;
    use vault_core::{KeyDerivationParams, Vault};

    fn unlocked_vault() -> (Vault, VaultSession, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut vault = Vault::open(temp_dir.path()).unwrap();

        let mut settings = vault.settings().clone();
        settings.kdf = KeyDerivationParams::new(1024, 1, 1);
        vault.update_settings(settings).unwrap();

        vault.initialize("master").unwrap();
        let session = vault.unlock("master").unwrap();
        (vault, session, temp_dir)
    }

    fn run_script(vault: &Vault, session: &VaultSession, script: &str) -> String {
        let mut output = Vec::new();
        Menu::new(session, vault.settings(), script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_add_generates_and_saves() {
        let (vault, session, _temp) = unlocked_vault();

        let output = run_script(
            &vault,
            &session,
            "a\n12\ny\nn\nn\nn\nexample.com\nalice\nn\nq\n",
        );
        assert!(output.contains("Password saved successfully!"));

        let stored = session.credentials().list_decrypted().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].website(), "example.com");
        assert_eq!(stored[0].expose().len(), 12);
        assert!(stored[0].expose().chars().all(|c| c.is_ascii_uppercase()));
        assert!(output.contains(&format!("Generated password: {}", stored[0].expose())));
    }

    #[test]
    fn test_add_reprompts_for_length() {
        let (vault, session, _temp) = unlocked_vault();

        let output = run_script(
            &vault,
            &session,
            "a\nabc\n5\n33\n8\ny\ny\ny\ny\nexample.com\nalice\ny\nq\n",
        );
        assert_eq!(
            output
                .matches("Invalid input. Please enter a number between 6 and 32.")
                .count(),
            3
        );

        let stored = session.credentials().list_decrypted().unwrap();
        assert_eq!(stored[0].expose().len(), 8);
        assert!(output.contains(&format!(
            "Website: example.com, Username: alice, Password: {}",
            stored[0].expose()
        )));
    }

    #[test]
    fn test_add_without_charsets_reports_error_and_continues() {
        let (vault, session, _temp) = unlocked_vault();

        let output = run_script(&vault, &session, "a\n10\nn\nn\nn\nn\nexample.com\nalice\nv\nq\n");
        assert!(output.contains("Error: Invalid argument"));
        assert!(output.contains("No passwords stored."));
        assert_eq!(session.credentials().count().unwrap(), 0);
    }

    #[test]
    fn test_update_and_delete() {
        let (vault, session, _temp) = unlocked_vault();
        session
            .credentials()
            .add("example.com", "alice", "old-password")
            .unwrap();

        let output = run_script(
            &vault,
            &session,
            "u\nexample.com\nalice\nnew-password\nu\nexample.com\nbob\nx\nd\nexample.com\nalice\nd\nexample.com\nalice\nq\n",
        );

        assert_eq!(output.matches(UPDATED).count(), 1);
        assert_eq!(output.matches(DELETED).count(), 1);
        assert_eq!(output.matches(NOT_FOUND).count(), 2);
        assert_eq!(session.credentials().count().unwrap(), 0);
    }

    #[test]
    fn test_update_changes_stored_password() {
        let (vault, session, _temp) = unlocked_vault();
        session
            .credentials()
            .add("example.com", "alice", "old-password")
            .unwrap();

        run_script(&vault, &session, "u\nexample.com\nalice\nnew-password\n");

        let stored = session.credentials().list_decrypted().unwrap();
        assert_eq!(stored[0].expose(), "new-password");
    }

    #[test]
    fn test_typed_password_keeps_whitespace() {
        let (vault, session, _temp) = unlocked_vault();
        session
            .credentials()
            .add("example.com", "alice", "old-password")
            .unwrap();

        let mut output = Vec::new();
        let mut menu = Menu::new(
            &session,
            vault.settings(),
            "example.com\nalice\n  padded secret \n".as_bytes(),
            &mut output,
        );
        menu.update().unwrap();
        drop(menu);

        let stored = session.credentials().list_decrypted().unwrap();
        assert_eq!(stored[0].expose(), "  padded secret ");
    }

    #[test]
    fn test_unknown_choice_and_eof() {
        let (vault, session, _temp) = unlocked_vault();

        let output = run_script(&vault, &session, "x\n");
        assert!(output.contains("Invalid choice."));
    }

    #[test]
    fn test_input_closed_mid_action_is_an_error() {
        let (vault, session, _temp) = unlocked_vault();

        let mut output = Vec::new();
        let result = Menu::new(
            &session,
            vault.settings(),
            "d\nexample.com\n".as_bytes(),
            &mut output,
        )
        .run();
        assert!(result.is_err());
    }
}
