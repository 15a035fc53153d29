use uuid::Uuid;
use vouch_types::{Status, UserRecord};

use crate::error::FieldError;

/// Upper bound on an encoded batch accepted by the decoder.
pub const MAX_BATCH_SIZE: usize = 64 * 1024 * 1024;

/// The `.proto` schema these messages implement, for non-Rust consumers.
pub const SCHEMA: &str = r#"syntax = "proto3";
package vouch;

message User {
  string id = 1;
  string email = 2;
  string role = 3;
  string status = 4;
  int64 createdAt = 5;
  string emailHash = 6;
  string signature = 7;
}

message Batch {
  repeated User users = 1;
}
"#;

/// One signed user on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub role: String,
    #[prost(string, tag = "4")]
    pub status: String,
    /// Epoch milliseconds.
    #[prost(int64, tag = "5")]
    pub created_at: i64,
    /// Lowercase hex SHA-384 of the canonical email.
    #[prost(string, tag = "6")]
    pub email_hash: String,
    /// Base64 Ed25519 signature over the raw hash bytes.
    #[prost(string, tag = "7")]
    pub signature: String,
}

/// An ordered export of users.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Batch {
    #[prost(message, repeated, tag = "1")]
    pub users: Vec<User>,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.to_string(),
            email: record.email().to_string(),
            role: record.role.clone(),
            status: record.status.as_str().to_string(),
            created_at: record.created_at,
            email_hash: record.email_hash().to_string(),
            signature: record.signature().to_string(),
        }
    }
}

impl User {
    /// Convert into a record. `index` is the position in the batch, for errors.
    ///
    /// Only structure is checked here: the id must be a UUID and the status
    /// exactly `active` or `inactive`. Hash and signature are carried through
    /// verbatim; judging them is the verifier's job.
    pub fn into_record(self, index: usize) -> Result<UserRecord, FieldError> {
        let invalid = |field: &'static str, value: &str, reason: String| FieldError {
            index,
            id: self.id.clone(),
            field,
            value: value.to_string(),
            reason,
        };
        let id = Uuid::parse_str(&self.id).map_err(|e| invalid("id", &self.id, e.to_string()))?;
        let status: Status = self
            .status
            .parse()
            .map_err(|e: vouch_types::TypeError| invalid("status", &self.status, e.to_string()))?;
        Ok(UserRecord::from_parts(
            id,
            self.email,
            self.role,
            status,
            self.created_at,
            self.email_hash,
            self.signature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_user() -> User {
        User {
            id: "6f1c2d9e-8a4b-4c3d-9e2f-1a2b3c4d5e6f".into(),
            email: "alice@example.com".into(),
            role: "user".into(),
            status: "active".into(),
            created_at: 1_700_000_000_123,
            email_hash: "ab".repeat(48),
            signature: "c2ln".into(),
        }
    }

    #[test]
    fn into_record_keeps_fields() {
        let record = wire_user().into_record(0).unwrap();
        assert_eq!(record.id.to_string(), "6f1c2d9e-8a4b-4c3d-9e2f-1a2b3c4d5e6f");
        assert_eq!(record.email(), "alice@example.com");
        assert_eq!(record.status, Status::Active);
        assert_eq!(record.created_at, 1_700_000_000_123);
        assert_eq!(record.email_hash(), "ab".repeat(48));
        assert_eq!(record.signature(), "c2ln");
    }

    #[test]
    fn record_to_wire_and_back() {
        let record = wire_user().into_record(0).unwrap();
        assert_eq!(User::from(&record), wire_user());
    }

    #[test]
    fn bad_id_reports_index() {
        let user = User { id: "not-a-uuid".into(), ..wire_user() };
        let err = user.into_record(3).unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.field, "id");
        assert_eq!(err.id, "not-a-uuid");
    }

    #[test]
    fn unknown_status_rejected() {
        let user = User { status: "suspended".into(), ..wire_user() };
        let err = user.into_record(0).unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(err.value, "suspended");
        assert_eq!(err.id, wire_user().id);
    }

    #[test]
    fn padded_status_is_not_rewritten() {
        for status in [" active", "Active", "active\n"] {
            let user = User { status: status.into(), ..wire_user() };
            let err = user.into_record(0).unwrap_err();
            assert_eq!(err.field, "status");
            assert_eq!(err.value, status);
        }
    }

    #[test]
    fn garbage_hash_and_signature_pass_through() {
        let user = User {
            email_hash: "tampered".into(),
            signature: "!!".into(),
            ..wire_user()
        };
        let record = user.into_record(0).unwrap();
        assert_eq!(record.email_hash(), "tampered");
        assert_eq!(record.signature(), "!!");
    }

    #[test]
    fn schema_lists_all_fields() {
        for field in ["id = 1", "email = 2", "role = 3", "status = 4", "createdAt = 5", "emailHash = 6", "signature = 7", "repeated User users = 1"] {
            assert!(SCHEMA.contains(field), "missing {field}");
        }
    }
}
