//! Session lifecycle: issuance, sliding-expiry lookup, invalidation.

mod store;
mod token;

pub use store::{Session, SessionStore};
pub use token::{generate_token, token_prefix, TOKEN_HEX_LEN};
