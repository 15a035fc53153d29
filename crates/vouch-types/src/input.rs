use serde::{Deserialize, Serialize};

use crate::email::parse_email;
use crate::error::{TypeError, TypeResult};
use crate::record::Status;

/// Roles a user may hold. Anything else is rejected on create and update.
pub const ROLES: [&str; 2] = ["user", "admin"];

/// Validate a role name.
pub fn parse_role(raw: &str) -> TypeResult<String> {
    let role = raw.trim();
    if ROLES.contains(&role) {
        Ok(role.to_string())
    } else {
        Err(TypeError::InvalidRole(role.to_string()))
    }
}

fn parse_status(raw: &str) -> TypeResult<Status> {
    raw.trim().parse()
}

/// Unvalidated input for creating a user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated create request; `email` is canonical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub role: String,
    pub status: Status,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> TypeResult<UserDraft> {
        Ok(UserDraft {
            email: parse_email(&self.email)?,
            role: self.role.as_deref().map(parse_role).transpose()?.unwrap_or_else(|| "user".into()),
            status: self.status.as_deref().map(parse_status).transpose()?.unwrap_or_default(),
        })
    }
}

/// Unvalidated partial update of a user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated update; at least one field is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidPatch {
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<Status>,
}

impl UserPatch {
    pub fn validate(&self) -> TypeResult<ValidPatch> {
        if self.email.is_none() && self.role.is_none() && self.status.is_none() {
            return Err(TypeError::EmptyPatch);
        }
        Ok(ValidPatch {
            email: self.email.as_deref().map(parse_email).transpose()?,
            role: self.role.as_deref().map(parse_role).transpose()?,
            status: self.status.as_deref().map(parse_status).transpose()?,
        })
    }
}
