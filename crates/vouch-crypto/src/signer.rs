use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;
use vouch_types::{canonical_email, Seal, UserDraft, UserRecord};

use crate::digest::EmailDigest;
use crate::error::SignError;
use crate::keystore::KeyManager;

/// Seals user records: canonical email → SHA-384 → Ed25519 signature.
///
/// Hash and signature are always produced together from the same canonical
/// email, and a record only ever receives all three at once.
#[derive(Clone, Debug)]
pub struct RecordSigner {
    keys: Arc<KeyManager>,
}

impl RecordSigner {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    /// Canonicalize `email`, hash it, and sign the raw hash bytes.
    pub fn seal(&self, email: &str) -> Result<Seal, SignError> {
        let canonical = canonical_email(email);
        let digest = EmailDigest::of_bytes(canonical.as_bytes());
        let signature = self.keys.sign(digest.as_bytes())?;
        Ok(Seal::new(canonical, digest.to_hex(), signature.to_base64()))
    }

    /// Build a freshly sealed record from a validated draft.
    pub fn issue(&self, id: Uuid, draft: &UserDraft, created_at: i64) -> Result<UserRecord, SignError> {
        let seal = self.seal(&draft.email)?;
        debug!(%id, "sealed new record");
        Ok(UserRecord::sealed(id, draft.role.clone(), draft.status, created_at, seal))
    }

    /// Give `record` a new email, regenerating hash and signature with it.
    ///
    /// On error the record is left unchanged.
    pub fn reseal(&self, record: &mut UserRecord, email: &str) -> Result<(), SignError> {
        let seal = self.seal(email)?;
        record.reseal(seal);
        debug!(id = %record.id, "resealed record after email change");
        Ok(())
    }
}
