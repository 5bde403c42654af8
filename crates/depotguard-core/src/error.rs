//! Shared error type across depotguard crates.

use thiserror::Error;

use crate::access::AccessMode;
use crate::level::SecurityLevel;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Token missing, unknown or expired; or credentials rejected.
    NotAuthenticated,
    /// Clearance insufficient for the requested access.
    AccessDenied,
    /// Rate window exceeded or identity banned.
    RateLimited,
    /// Lockout active for the identity.
    AccountLocked,
    /// Malformed identity, token, level or code.
    InvalidInput,
    /// Internal fault in a collaborator.
    Internal,
}

impl ClientCode {
    /// String representation used in responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ClientCode::AccessDenied => "ACCESS_DENIED",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::AccountLocked => "ACCOUNT_LOCKED",
            ClientCode::InvalidInput => "INVALID_INPUT",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Why a caller is not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    UnknownToken,
    Expired,
    BadCredentials,
}

impl AuthFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "missing token",
            AuthFailure::UnknownToken => "unknown token",
            AuthFailure::Expired => "session expired",
            AuthFailure::BadCredentials => "bad credentials",
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Unified error type used by core and engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("not authenticated: {0}")]
    NotAuthenticated(AuthFailure),
    #[error("access denied: {mode} on {required} data with {clearance} clearance")]
    AccessDenied {
        clearance: SecurityLevel,
        required: SecurityLevel,
        mode: AccessMode,
    },
    #[error("rate limited")]
    RateLimited,
    #[error("account locked")]
    AccountLocked,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GuardError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GuardError::NotAuthenticated(_) => ClientCode::NotAuthenticated,
            GuardError::AccessDenied { .. } => ClientCode::AccessDenied,
            GuardError::RateLimited => ClientCode::RateLimited,
            GuardError::AccountLocked => ClientCode::AccountLocked,
            GuardError::InvalidInput(_) => ClientCode::InvalidInput,
            GuardError::Internal(_) => ClientCode::Internal,
        }
    }
}
