use prost::Message;
use tracing::debug;
use vouch_types::UserRecord;

use crate::error::{DecodeError, DecodeResult, FieldError};
use crate::message::{Batch, User, MAX_BATCH_SIZE};

/// A structurally valid batch, one entry per wire record in wire order.
///
/// Entries whose id or status does not parse are kept in place as errors so
/// one odd record cannot hide the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    entries: Vec<Result<UserRecord, FieldError>>,
}

impl DecodedBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Result<UserRecord, FieldError>] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Result<UserRecord, FieldError>> {
        self.entries
    }

    /// Records that converted cleanly, in wire order.
    pub fn records(&self) -> impl Iterator<Item = &UserRecord> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    pub fn invalid(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter().filter_map(|e| e.as_ref().err())
    }

    /// Drop invalid entries and keep the records.
    pub fn into_records(self) -> Vec<UserRecord> {
        self.entries.into_iter().filter_map(Result::ok).collect()
    }
}

/// Codec between record slices and `Batch`-encoded bytes.
pub struct BatchCodec;

impl BatchCodec {
    /// Encode records in the order given.
    pub fn encode(records: &[UserRecord]) -> Vec<u8> {
        let batch = Batch {
            users: records.iter().map(User::from).collect(),
        };
        let bytes = batch.encode_to_vec();
        debug!(records = records.len(), bytes = bytes.len(), "encoded batch");
        bytes
    }

    /// Decode bytes into records, preserving wire order.
    ///
    /// A truncated buffer or protobuf structure error fails the whole batch.
    /// A record with an unparseable id or status fails only its own entry.
    pub fn decode(bytes: &[u8]) -> DecodeResult<DecodedBatch> {
        let batch = Self::decode_message(bytes)?;
        let entries: Vec<_> = batch
            .users
            .into_iter()
            .enumerate()
            .map(|(index, user)| user.into_record(index))
            .collect();
        let decoded = DecodedBatch { entries };
        let invalid = decoded.invalid().count();
        if invalid > 0 {
            debug!(records = decoded.len(), invalid, "decoded batch with invalid records");
        }
        Ok(decoded)
    }

    /// Decode the raw protobuf message without converting to records.
    pub fn decode_message(bytes: &[u8]) -> DecodeResult<Batch> {
        if bytes.len() > MAX_BATCH_SIZE {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                max: MAX_BATCH_SIZE,
            });
        }
        Batch::decode(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;
    use vouch_crypto::{KeyManager, RecordSigner};
    use vouch_types::{Status, UserDraft};

    fn records(n: usize) -> (tempfile::TempDir, Vec<UserRecord>) {
        let dir = tempfile::tempdir().unwrap();
        let signer = RecordSigner::new(Arc::new(KeyManager::open(dir.path()).unwrap()));
        let records = (0..n)
            .map(|i| {
                let draft = UserDraft {
                    email: format!("user{i}@example.com"),
                    role: if i % 2 == 0 { "user".into() } else { "admin".into() },
                    status: if i % 3 == 0 { Status::Inactive } else { Status::Active },
                };
                signer.issue(Uuid::new_v4(), &draft, 1_700_000_000_000 - i as i64).unwrap()
            })
            .collect();
        (dir, records)
    }

    #[test]
    fn empty_batch_roundtrip() {
        let bytes = BatchCodec::encode(&[]);
        assert!(bytes.is_empty());
        assert!(BatchCodec::decode(&bytes).unwrap().is_empty());
        assert_eq!(BatchCodec::decode(&bytes).unwrap(), DecodedBatch::default());
    }

    #[test]
    fn single_record_roundtrip() {
        let (_dir, recs) = records(1);
        let decoded = BatchCodec::decode(&BatchCodec::encode(&recs)).unwrap();
        assert_eq!(decoded.into_records(), recs);
    }

    #[test]
    fn many_records_roundtrip_in_order() {
        let (_dir, recs) = records(25);
        let decoded = BatchCodec::decode(&BatchCodec::encode(&recs)).unwrap();
        assert_eq!(decoded.invalid().count(), 0);
        let decoded = decoded.into_records();
        assert_eq!(decoded, recs);
        let ids: Vec<_> = decoded.iter().map(|r| r.id).collect();
        let expected: Vec<_> = recs.iter().map(|r| r.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn encoding_is_deterministic() {
        let (_dir, recs) = records(3);
        assert_eq!(BatchCodec::encode(&recs), BatchCodec::encode(&recs));
    }

    #[test]
    fn truncated_buffer_fails_without_partial_result() {
        let (_dir, recs) = records(3);
        let bytes = BatchCodec::encode(&recs);
        let err = BatchCodec::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn truncated_mid_length_prefix_fails() {
        let (_dir, recs) = records(2);
        let bytes = BatchCodec::encode(&recs);
        assert!(BatchCodec::decode(&bytes[..1]).is_err());
    }

    #[test]
    fn garbage_bytes_fail() {
        assert!(BatchCodec::decode(&[0xff, 0xff, 0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn invalid_record_stays_in_place() {
        let (_dir, recs) = records(3);
        let mut batch = Batch {
            users: recs.iter().map(User::from).collect(),
        };
        batch.users[1].status = "archived".into();
        let decoded = BatchCodec::decode(&batch.encode_to_vec()).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.entries()[0].as_ref().unwrap(), &recs[0]);
        assert_eq!(decoded.entries()[2].as_ref().unwrap(), &recs[2]);

        let err = decoded.entries()[1].as_ref().unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.field, "status");
        assert_eq!(err.id, recs[1].id.to_string());
        assert_eq!(decoded.into_records(), vec![recs[0].clone(), recs[2].clone()]);
    }

    #[test]
    fn non_uuid_id_keeps_raw_id() {
        let (_dir, recs) = records(2);
        let mut batch = Batch {
            users: recs.iter().map(User::from).collect(),
        };
        batch.users[0].id = "user-17".into();
        let decoded = BatchCodec::decode(&batch.encode_to_vec()).unwrap();
        let invalid: Vec<_> = decoded.invalid().collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].id, "user-17");
        assert_eq!(invalid[0].field, "id");
        assert_eq!(decoded.records().count(), 1);
    }

    #[test]
    fn decode_message_exposes_raw_fields() {
        let (_dir, recs) = records(1);
        let batch = BatchCodec::decode_message(&BatchCodec::encode(&recs)).unwrap();
        assert_eq!(batch.users[0].email_hash, recs[0].email_hash());
        assert_eq!(batch.users[0].created_at, recs[0].created_at);
    }
}
