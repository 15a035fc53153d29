use thiserror::Error;

/// Errors produced by type parsing and input validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid status: {0} (allowed: active, inactive)")]
    InvalidStatus(String),

    #[error("invalid role: {0} (allowed: user, admin)")]
    InvalidRole(String),

    #[error("invalid user id: {0}")]
    InvalidId(String),

    #[error("no fields provided for update; expected at least one of: email, role, status")]
    EmptyPatch,
}

pub type TypeResult<T> = Result<T, TypeError>;
