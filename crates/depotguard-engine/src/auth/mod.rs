//! Authentication and request authorization flows.
//!
//! Login order: input shape → lockout → `LOGIN` rate limit → credentials.
//! A locked or rate-limited identity never reaches the credential verifier.

mod authenticator;

pub use authenticator::{Authenticator, CredentialVerifier, LoginGrant, LoginRequest, Principal};
