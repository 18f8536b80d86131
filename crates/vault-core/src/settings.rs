//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file.
//! Settings are readable before the master password is entered.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crypto::KeyDerivationParams;
use crate::error::{Result, VaultError};
use crate::fs::write_atomic;
use crate::generator::{validate_length, CharsetFlags, DEFAULT_PASSWORD_LENGTH};
use crate::master::MASTER_FILE;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Default credential database file name
pub const DATABASE_FILE: &str = "passwords.db";

const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Argon2id parameters used when a master password is first set
    pub kdf: KeyDerivationParams,
    /// Length used for generated passwords when none is given
    pub default_password_length: usize,
    /// Character sets used for generated passwords when none are given
    pub default_charset: CharsetFlags,
    /// Credential database file name
    pub database_file: String,
    /// Master password file name
    pub master_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: SETTINGS_VERSION,
            kdf: KeyDerivationParams::default(),
            default_password_length: DEFAULT_PASSWORD_LENGTH,
            default_charset: CharsetFlags::default(),
            database_file: DATABASE_FILE.to_string(),
            master_file: MASTER_FILE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != SETTINGS_VERSION {
            return Err(VaultError::ParseError(format!(
                "Unsupported settings version: {}",
                self.version
            )));
        }

        self.kdf.validate()?;
        validate_length(self.default_password_length)?;

        if !self.default_charset.any() {
            return Err(VaultError::InvalidArgument(
                "Default charset must enable at least one character set".to_string(),
            ));
        }

        validate_file_name("databaseFile", &self.database_file)?;
        validate_file_name("masterFile", &self.master_file)?;
        if self.database_file == self.master_file {
            return Err(VaultError::InvalidArgument(
                "databaseFile and masterFile must differ".to_string(),
            ));
        }

        Ok(())
    }
}

/// Files live directly inside the data directory
fn validate_file_name(field: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );

    if !plain || name == SETTINGS_FILE {
        return Err(VaultError::InvalidArgument(format!(
            "{} must be a plain file name, got {:?}",
            field, name
        )));
    }
    Ok(())
}

/// Settings manager
#[derive(Debug)]
pub struct SettingsManager {
    data_dir: PathBuf,
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `data_dir`, falling back to defaults when no file exists
    ///
    /// A settings file that cannot be parsed or fails validation is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_file = data_dir.join(SETTINGS_FILE);
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            settings_file,
            settings,
        })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| VaultError::ParseError(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;

        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;
        write_atomic(&self.settings_file, contents.as_bytes())?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Validate, replace, and save settings
    pub fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save()
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&mut self) -> Result<()> {
        self.settings = Settings::new();

        if self.settings_file.exists() {
            std::fs::remove_file(&self.settings_file)?;
        }
        Ok(())
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_file
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings.database_file)
    }

    pub fn master_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings.master_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::load(temp_dir.path()).unwrap();

        let settings = manager.get();
        assert_eq!(settings.default_password_length, 16);
        assert_eq!(settings.default_charset, CharsetFlags::default());
        assert_eq!(settings.kdf, KeyDerivationParams::default());
        assert_eq!(manager.database_path(), temp_dir.path().join("passwords.db"));
        assert_eq!(manager.master_path(), temp_dir.path().join("master.hash"));
        assert!(!manager.settings_path().exists());
    }

    #[test]
    fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::load(temp_dir.path()).unwrap();
            let mut settings = manager.get().clone();
            settings.default_password_length = 24;
            settings.default_charset.symbols = false;
            settings.kdf = KeyDerivationParams::new(1024, 1, 1);
            manager.update(settings).unwrap();
        }

        let manager = SettingsManager::load(temp_dir.path()).unwrap();
        assert_eq!(manager.get().default_password_length, 24);
        assert!(!manager.get().default_charset.symbols);
        assert_eq!(manager.get().kdf, KeyDerivationParams::new(1024, 1, 1));
    }

    #[test]
    fn test_camel_case_keys_and_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            r#"{ "version": 1, "defaultPasswordLength": 20 }"#,
        )
        .unwrap();

        let manager = SettingsManager::load(temp_dir.path()).unwrap();
        assert_eq!(manager.get().default_password_length, 20);
        assert_eq!(manager.get().database_file, "passwords.db");

        let json = serde_json::to_string(manager.get()).unwrap();
        assert!(json.contains("\"defaultCharset\""));
        assert!(json.contains("\"memoryCost\""));
    }

    #[test]
    fn test_update_rejects_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::load(temp_dir.path()).unwrap();

        let mut settings = Settings::new();
        settings.default_password_length = 40;
        assert!(matches!(
            manager.update(settings),
            Err(VaultError::InvalidArgument(_))
        ));

        let mut settings = Settings::new();
        settings.default_charset = CharsetFlags::none();
        assert!(manager.update(settings).is_err());

        let mut settings = Settings::new();
        settings.database_file = "../elsewhere.db".to_string();
        assert!(manager.update(settings).is_err());

        let mut settings = Settings::new();
        settings.master_file = settings.database_file.clone();
        assert!(manager.update(settings).is_err());

        assert_eq!(manager.get(), &Settings::new());
        assert!(!manager.settings_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(SETTINGS_FILE), "{ not json").unwrap();

        assert!(matches!(
            SettingsManager::load(temp_dir.path()),
            Err(VaultError::ParseError(_))
        ));
    }

    #[test]
    fn test_reset() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::load(temp_dir.path()).unwrap();

        let mut settings = Settings::new();
        settings.default_password_length = 8;
        manager.update(settings).unwrap();
        assert!(manager.settings_path().exists());

        manager.reset().unwrap();
        assert_eq!(manager.get().default_password_length, 16);
        assert!(!manager.settings_path().exists());
    }
}
