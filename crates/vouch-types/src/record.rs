use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Account status of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match on the lowercase name; no whitespace or case folding.
impl FromStr for Status {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(TypeError::InvalidStatus(other.to_string())),
        }
    }
}

/// The trust-bearing triple of a record: canonical email, its hex digest,
/// and the base64 signature over the digest bytes.
///
/// The three values are produced together by the signer and only ever
/// replace each other together on a [`UserRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seal {
    email: String,
    email_hash: String,
    signature: String,
}

impl Seal {
    pub fn new(
        email: impl Into<String>,
        email_hash: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            email_hash: email_hash.into(),
            signature: signature.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_hash(&self) -> &str {
        &self.email_hash
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// A user record with its email hash and signature attached.
///
/// `email`, `email_hash` and `signature` are private: on the signing side
/// they can only change through [`UserRecord::reseal`], which swaps all
/// three at once. [`UserRecord::from_parts`] exists for the consuming side,
/// which rebuilds records from untrusted wire fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    email: String,
    pub role: String,
    pub status: Status,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    email_hash: String,
    signature: String,
}

impl UserRecord {
    /// Build a record on the signing side from a fresh seal.
    pub fn sealed(id: Uuid, role: impl Into<String>, status: Status, created_at: i64, seal: Seal) -> Self {
        Self {
            id,
            email: seal.email,
            role: role.into(),
            status,
            created_at,
            email_hash: seal.email_hash,
            signature: seal.signature,
        }
    }

    /// Rebuild a record from raw field values without any checks.
    pub fn from_parts(
        id: Uuid,
        email: String,
        role: String,
        status: Status,
        created_at: i64,
        email_hash: String,
        signature: String,
    ) -> Self {
        Self {
            id,
            email,
            role,
            status,
            created_at,
            email_hash,
            signature,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_hash(&self) -> &str {
        &self.email_hash
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Replace email, hash and signature in one step.
    pub fn reseal(&mut self, seal: Seal) {
        self.email = seal.email;
        self.email_hash = seal.email_hash;
        self.signature = seal.signature;
    }

    /// Creation time as a UTC timestamp, if in chrono's representable range.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}
