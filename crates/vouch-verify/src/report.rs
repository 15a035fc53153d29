use std::fmt;

use vouch_protocol::FieldError;
use vouch_types::UserRecord;

/// Why a record was left out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The signature does not verify over the recomputed email digest.
    Signature,
    /// The id or status on the wire could not be parsed.
    InvalidField { field: &'static str, reason: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("signature does not verify"),
            Self::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

/// A record left out of the trusted set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the batch as sent.
    pub index: usize,
    /// The id as it appeared on the wire.
    pub id: String,
    pub reason: RejectReason,
}

impl From<FieldError> for Rejection {
    fn from(e: FieldError) -> Self {
        Self {
            index: e.index,
            id: e.id,
            reason: RejectReason::InvalidField { field: e.field, reason: e.reason },
        }
    }
}

/// Records that passed verification, in decode order, plus which ones did not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrustedSet {
    trusted: Vec<UserRecord>,
    rejected: Vec<Rejection>,
}

impl TrustedSet {
    /// Pair each record with its verdict. `verdicts[i]` belongs to `records[i]`.
    pub(crate) fn from_verdicts(records: Vec<UserRecord>, verdicts: impl IntoIterator<Item = bool>) -> Self {
        let mut set = Self::default();
        for (index, (record, ok)) in records.into_iter().zip(verdicts).enumerate() {
            if ok {
                set.trusted.push(record);
            } else {
                set.rejected.push(Rejection {
                    index,
                    id: record.id.to_string(),
                    reason: RejectReason::Signature,
                });
            }
        }
        set
    }

    /// Rewrite rejection indexes from verified-record positions to batch
    /// positions and merge in records that never reached verification.
    ///
    /// `positions[i]` is the batch index of the i-th verified record.
    pub(crate) fn place(mut self, positions: &[usize], invalid: Vec<Rejection>) -> Self {
        for r in &mut self.rejected {
            r.index = positions[r.index];
        }
        if !invalid.is_empty() {
            self.rejected.extend(invalid);
            self.rejected.sort_by_key(|r| r.index);
        }
        self
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.trusted
    }

    pub fn into_records(self) -> Vec<UserRecord> {
        self.trusted
    }

    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.trusted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty()
    }

    /// Number of records that were checked.
    pub fn total(&self) -> usize {
        self.trusted.len() + self.rejected.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserRecord> {
        self.trusted.iter()
    }
}

impl IntoIterator for TrustedSet {
    type Item = UserRecord;
    type IntoIter = std::vec::IntoIter<UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.trusted.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrustedSet {
    type Item = &'a UserRecord;
    type IntoIter = std::slice::Iter<'a, UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.trusted.iter()
    }
}
