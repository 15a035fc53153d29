use std::fmt;

use bytes::Bytes;
use tracing::{debug, info, warn};
use vouch_protocol::BatchCodec;
use vouch_types::UserRecord;

use crate::error::VerifyResult;
use crate::filter::TrustFilter;
use crate::report::{Rejection, TrustedSet};
use crate::verifier::RecordVerifier;

/// Stages a batch moves through on the consuming side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Fetched,
    Decoding,
    DecodeFailed,
    Decoded,
    PerRecordVerify,
    TrustedSet,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetched => "fetched",
            Self::Decoding => "decoding",
            Self::DecodeFailed => "decode-failed",
            Self::Decoded => "decoded",
            Self::PerRecordVerify => "per-record-verify",
            Self::TrustedSet => "trusted-set",
        };
        f.write_str(name)
    }
}

/// Batch bytes and the server's public key, as received.
#[derive(Clone, Debug)]
pub struct Fetched {
    bytes: Bytes,
    public_key_pem: String,
}

impl Fetched {
    pub fn new(bytes: impl Into<Bytes>, public_key_pem: impl Into<String>) -> Self {
        let fetched = Self {
            bytes: bytes.into(),
            public_key_pem: public_key_pem.into(),
        };
        debug!(stage = %Stage::Fetched, bytes = fetched.bytes.len(), "batch received");
        fetched
    }

    /// Decode the batch. A malformed buffer is terminal for the whole batch;
    /// records with an unparseable id or status are set aside as rejections.
    pub fn decode(self) -> VerifyResult<Decoded> {
        debug!(stage = %Stage::Decoding, "decoding batch");
        let batch = match BatchCodec::decode(&self.bytes) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(stage = %Stage::DecodeFailed, error = %e, "batch rejected");
                return Err(e.into());
            }
        };

        let mut records = Vec::with_capacity(batch.len());
        let mut positions = Vec::with_capacity(batch.len());
        let mut invalid = Vec::new();
        for (index, entry) in batch.into_entries().into_iter().enumerate() {
            match entry {
                Ok(record) => {
                    records.push(record);
                    positions.push(index);
                }
                Err(e) => {
                    warn!(index, id = %e.id, field = e.field, value = %e.value, "record rejected at decode");
                    invalid.push(Rejection::from(e));
                }
            }
        }
        debug!(
            stage = %Stage::Decoded,
            records = records.len(),
            invalid = invalid.len(),
            "batch decoded"
        );
        Ok(Decoded {
            records,
            positions,
            invalid,
            filter: TrustFilter::new(RecordVerifier::from_pem(&self.public_key_pem)),
        })
    }
}

/// A decoded batch awaiting per-record verification.
#[derive(Clone, Debug)]
pub struct Decoded {
    records: Vec<UserRecord>,
    positions: Vec<usize>,
    invalid: Vec<Rejection>,
    filter: TrustFilter,
}

impl Decoded {
    /// Records that decoded cleanly, in batch order.
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Records already rejected because a field did not parse.
    pub fn invalid(&self) -> &[Rejection] {
        &self.invalid
    }

    /// Verify sequentially.
    pub fn verify(self) -> TrustedSet {
        debug!(stage = %Stage::PerRecordVerify, workers = 1, "verifying records");
        let set = self.filter.filter(self.records);
        finish(set.place(&self.positions, self.invalid))
    }

    /// Verify on a bounded worker pool. Output order is decode order.
    pub async fn verify_concurrent(self, workers: usize) -> TrustedSet {
        debug!(stage = %Stage::PerRecordVerify, workers, "verifying records");
        let set = self.filter.filter_concurrent(self.records, workers).await;
        finish(set.place(&self.positions, self.invalid))
    }
}

fn finish(set: TrustedSet) -> TrustedSet {
    info!(
        stage = %Stage::TrustedSet,
        trusted = set.len(),
        rejected = set.rejected().len(),
        "batch verified"
    );
    set
}

/// Decode `bytes` and return the records that verify under `public_key_pem`.
pub fn trusted_set(bytes: impl Into<Bytes>, public_key_pem: &str) -> VerifyResult<TrustedSet> {
    Ok(Fetched::new(bytes, public_key_pem).decode()?.verify())
}

/// As [`trusted_set`], verifying with up to `workers` checks in flight.
pub async fn trusted_set_concurrent(
    bytes: impl Into<Bytes>,
    public_key_pem: &str,
    workers: usize,
) -> VerifyResult<TrustedSet> {
    Ok(Fetched::new(bytes, public_key_pem)
        .decode()?
        .verify_concurrent(workers)
        .await)
}
