use tracing::warn;
use vouch_crypto::{EmailDigest, VerifyingKey};
use vouch_types::UserRecord;

use crate::error::{VerifyError, VerifyResult};

/// Checks one record against the server's public key.
///
/// The digest is always recomputed from the record's email; the record's
/// stored `email_hash` plays no part.
#[derive(Clone, Debug)]
pub struct RecordVerifier {
    key: Option<VerifyingKey>,
}

impl RecordVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key: Some(key) }
    }

    /// Parse a PEM public key, failing loudly if it is unusable.
    pub fn try_from_pem(pem: &str) -> VerifyResult<Self> {
        VerifyingKey::from_pem(pem)
            .map(Self::new)
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))
    }

    /// Parse a PEM public key. An unusable key yields a verifier that
    /// rejects every record.
    pub fn from_pem(pem: &str) -> Self {
        match VerifyingKey::from_pem(pem) {
            Ok(key) => Self::new(key),
            Err(e) => {
                warn!(error = %e, "public key unusable; no record will verify");
                Self { key: None }
            }
        }
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// `true` iff the record's signature is valid over the digest of its email.
    pub fn verify(&self, record: &UserRecord) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        let digest = EmailDigest::of(record.email());
        key.verify_base64(digest.as_bytes(), record.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;
    use vouch_crypto::{KeyManager, RecordSigner};
    use vouch_types::{Status, UserDraft};

    struct Fixture {
        _dir: tempfile::TempDir,
        signer: RecordSigner,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let keys = Arc::new(KeyManager::open(dir.path()).unwrap());
            Self { _dir: dir, signer: RecordSigner::new(keys) }
        }

        fn record(&self, email: &str) -> UserRecord {
            let draft = UserDraft { email: email.into(), role: "user".into(), status: Status::Active };
            self.signer.issue(Uuid::new_v4(), &draft, 1_700_000_000_000).unwrap()
        }

        fn verifier(&self) -> RecordVerifier {
            RecordVerifier::from_pem(self.signer.keys().public_key_pem().unwrap())
        }
    }

    fn with_fields(r: &UserRecord, email: &str, hash: &str, sig: &str) -> UserRecord {
        UserRecord::from_parts(r.id, email.into(), r.role.clone(), r.status, r.created_at, hash.into(), sig.into())
    }

    #[test]
    fn valid_record_verifies() {
        let fx = Fixture::new();
        assert!(fx.verifier().verify(&fx.record("alice@example.com")));
    }

    #[test]
    fn stored_hash_is_ignored() {
        let fx = Fixture::new();
        let r = fx.record("alice@example.com");
        let tampered = with_fields(&r, r.email(), &"00".repeat(48), r.signature());
        assert!(fx.verifier().verify(&tampered));
        let garbage = with_fields(&r, r.email(), "not-hex", r.signature());
        assert!(fx.verifier().verify(&garbage));
    }

    #[test]
    fn changed_email_fails() {
        let fx = Fixture::new();
        let r = fx.record("alice@example.com");
        let tampered = with_fields(&r, "mallory@example.com", r.email_hash(), r.signature());
        assert!(!fx.verifier().verify(&tampered));
    }

    #[test]
    fn email_case_and_whitespace_do_not_matter() {
        let fx = Fixture::new();
        let r = fx.record("alice@example.com");
        let shouty = with_fields(&r, "  ALICE@Example.com ", r.email_hash(), r.signature());
        assert!(fx.verifier().verify(&shouty));
    }

    #[test]
    fn other_key_fails() {
        let a = Fixture::new();
        let b = Fixture::new();
        assert!(!b.verifier().verify(&a.record("alice@example.com")));
    }

    #[test]
    fn malformed_signature_is_false() {
        let fx = Fixture::new();
        let r = fx.record("alice@example.com");
        for sig in ["", "@@@", "AAAA", &r.signature()[4..]] {
            assert!(!fx.verifier().verify(&with_fields(&r, r.email(), r.email_hash(), sig)));
        }
    }

    #[test]
    fn unusable_key_rejects_everything() {
        let fx = Fixture::new();
        let verifier = RecordVerifier::from_pem("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n");
        assert!(!verifier.has_key());
        assert!(!verifier.verify(&fx.record("alice@example.com")));
    }

    #[test]
    fn try_from_pem_reports_bad_key() {
        assert!(matches!(RecordVerifier::try_from_pem("nope"), Err(VerifyError::InvalidPublicKey(_))));
    }
}
