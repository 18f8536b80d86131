//! Property-based tests for the credential cipher.

use proptest::prelude::*;
use vault_core::crypto::{CredentialCipher, MasterKey, NONCE_LEN, TAG_LEN};
use vault_core::VaultError;

/// Fixed key for property tests.
const PROP_KEY: [u8; 32] = [0xA5; 32];

fn cipher() -> CredentialCipher {
    CredentialCipher::new(MasterKey::new(PROP_KEY))
}

proptest! {
    /// Encrypt→decrypt recovers the plaintext for any AAD.
    #[test]
    fn encrypt_decrypt_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        aad in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let cipher = cipher();
        let sealed = cipher.encrypt(&plaintext, &aad).unwrap();
        prop_assert_eq!(cipher.decrypt(&sealed, &aad).unwrap(), plaintext);
    }

    /// Stored passwords round-trip through the text format.
    #[test]
    fn password_roundtrip(
        website in "\\PC{1,40}",
        username in "\\PC{1,40}",
        password in "\\PC{0,64}",
    ) {
        let cipher = cipher();
        let stored = cipher.encrypt_password(&website, &username, &password).unwrap();
        let recovered = cipher.decrypt_password(&website, &username, &stored).unwrap();
        prop_assert_eq!(recovered.expose(), password.as_str());
    }

    /// Flipping any single bit of nonce, tag, or ciphertext is detected.
    #[test]
    fn single_bit_flip_is_detected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let cipher = cipher();
        let mut sealed = cipher.encrypt(&plaintext, b"row").unwrap();

        let total = NONCE_LEN + TAG_LEN + sealed.ciphertext.len();
        let index = position.index(total);
        let byte = if index < NONCE_LEN {
            &mut sealed.nonce[index]
        } else if index < NONCE_LEN + TAG_LEN {
            &mut sealed.auth_tag[index - NONCE_LEN]
        } else {
            &mut sealed.ciphertext[index - NONCE_LEN - TAG_LEN]
        };
        *byte ^= 1 << bit;

        let result = cipher.decrypt(&sealed, b"row");
        prop_assert!(matches!(result, Err(VaultError::IntegrityError(_))));
    }

    /// A ciphertext moved to a different (website, username) row does not decrypt.
    #[test]
    fn ciphertext_is_bound_to_its_row(
        website in "[a-z]{1,12}\\.com",
        username in "[a-z]{1,12}",
        other in "[a-z]{1,12}",
        password in "\\PC{1,32}",
    ) {
        prop_assume!(username != other);

        let cipher = cipher();
        let stored = cipher.encrypt_password(&website, &username, &password).unwrap();
        let result = cipher.decrypt_password(&website, &other, &stored);
        prop_assert!(matches!(result, Err(VaultError::IntegrityError(_))));
    }
}
