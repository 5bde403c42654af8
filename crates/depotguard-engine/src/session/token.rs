use rand::rngs::OsRng;
use rand::RngCore;

/// Raw entropy per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Length of a hex-encoded token.
pub const TOKEN_HEX_LEN: usize = TOKEN_BYTES * 2;

/// Cryptographically random, hex-encoded session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Loggable prefix of a token; full tokens never reach the logs.
pub fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
