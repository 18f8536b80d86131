//! Process exit status
//!
//! 0 on success (including first-run setup), 2 when the master password is
//! rejected, 1 for anything else.

use std::io::Write;

use anyhow::Result;
use vault_core::VaultError;

pub const SUCCESS: u8 = 0;
pub const FAILURE: u8 = 1;
pub const ACCESS_DENIED: u8 = 2;

pub const ACCESS_DENIED_MESSAGE: &str = "Incorrect master password. Access denied.";

/// Print the error of a finished run, if any, and return its exit status
pub fn report(result: &Result<()>, err_out: &mut impl Write) -> u8 {
    let Err(err) = result else {
        return SUCCESS;
    };

    // Nothing useful can be done if stderr itself is gone
    if is_authentication_failure(err) {
        let _ = writeln!(err_out, "{}", ACCESS_DENIED_MESSAGE);
        ACCESS_DENIED
    } else {
        let _ = writeln!(err_out, "Error: {:#}", err);
        FAILURE
    }
}

/// True when a rejected master password is anywhere in the error chain
pub fn is_authentication_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<VaultError>(),
            Some(VaultError::AuthenticationFailure)
        )
    })
}
