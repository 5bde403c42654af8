//! Shape checks for identities and tokens, run before any component is touched.

use depotguard_core::error::{GuardError, Result};

use crate::session::TOKEN_HEX_LEN;

const IDENTITY_MIN: usize = 3;
const IDENTITY_MAX: usize = 64;

/// 3..=64 chars of `[A-Za-z0-9_.@-]`.
pub fn validate_identity(identity: &str) -> Result<()> {
    let len = identity.chars().count();
    if !(IDENTITY_MIN..=IDENTITY_MAX).contains(&len) {
        return Err(GuardError::InvalidInput(format!(
            "identity must be {IDENTITY_MIN}-{IDENTITY_MAX} characters"
        )));
    }
    if !identity
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'))
    {
        return Err(GuardError::InvalidInput(
            "identity may only contain letters, digits, '_', '.', '@' and '-'".into(),
        ));
    }
    Ok(())
}

/// Lowercase hex of the issued length.
pub fn validate_token(token: &str) -> Result<()> {
    if token.len() != TOKEN_HEX_LEN
        || !token.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err(GuardError::InvalidInput("malformed session token".into()));
    }
    Ok(())
}
