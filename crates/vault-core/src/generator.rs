//! Random password generation
//!
//! Characters are drawn from the OS CSPRNG. Every enabled character set is
//! represented at least once and the result is shuffled afterwards.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Minimum allowed password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum allowed password length
pub const MAX_PASSWORD_LENGTH: usize = 32;

/// Default password length
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = br"!@#$%^&*()_+~`|}{[]\:;?><,./-=";

/// Which character sets a generated password may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharsetFlags {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for CharsetFlags {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl CharsetFlags {
    pub fn none() -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
        }
    }

    pub fn any(&self) -> bool {
        self.uppercase || self.lowercase || self.numbers || self.symbols
    }

    fn enabled_sets(&self) -> Vec<&'static [u8]> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(enabled, set)| enabled.then_some(set))
        .collect()
    }
}

/// Check a requested password length
pub fn validate_length(length: usize) -> Result<()> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(VaultError::InvalidArgument(format!(
            "Password length must be between {} and {} characters, got {}",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, length
        )));
    }
    Ok(())
}

/// Generate a random password of `length` characters from the enabled sets
pub fn generate_password(length: usize, charsets: &CharsetFlags) -> Result<String> {
    validate_length(length)?;

    let sets = charsets.enabled_sets();
    if sets.is_empty() {
        return Err(VaultError::InvalidArgument(
            "At least one character type must be selected".to_string(),
        ));
    }

    let mut rng = OsRng;
    let pool: Vec<u8> = sets.concat();

    // One from each enabled set, the rest from the combined pool
    let mut chars: Vec<u8> = sets
        .iter()
        .map(|set| set[rng.gen_range(0..set.len())])
        .collect();
    while chars.len() < length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_only() {
        let flags = CharsetFlags {
            uppercase: true,
            ..CharsetFlags::none()
        };

        let password = generate_password(10, &flags).unwrap();
        assert_eq!(password.len(), 10);
        assert!(password.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_length_bounds() {
        let flags = CharsetFlags::default();

        assert!(matches!(
            generate_password(5, &flags),
            Err(VaultError::InvalidArgument(_))
        ));
        assert!(matches!(
            generate_password(33, &flags),
            Err(VaultError::InvalidArgument(_))
        ));
        assert_eq!(generate_password(6, &flags).unwrap().len(), 6);
        assert_eq!(generate_password(32, &flags).unwrap().len(), 32);
    }

    #[test]
    fn test_no_charset_rejected() {
        let result = generate_password(8, &CharsetFlags::none());
        assert!(matches!(result, Err(VaultError::InvalidArgument(_))));
    }

    #[test]
    fn test_every_enabled_set_represented() {
        for _ in 0..50 {
            let password = generate_password(6, &CharsetFlags::default()).unwrap();

            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.bytes().any(|b| SYMBOLS.contains(&b)));
        }
    }

    #[test]
    fn test_numbers_and_symbols_only() {
        let flags = CharsetFlags {
            numbers: true,
            symbols: true,
            ..CharsetFlags::none()
        };

        let password = generate_password(20, &flags).unwrap();
        assert!(password
            .bytes()
            .all(|b| NUMBERS.contains(&b) || SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_passwords_differ() {
        let flags = CharsetFlags::default();
        let first = generate_password(32, &flags).unwrap();
        let second = generate_password(32, &flags).unwrap();
        assert_ne!(first, second);
    }
}
