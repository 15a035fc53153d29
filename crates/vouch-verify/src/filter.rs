use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::warn;
use vouch_types::UserRecord;

use crate::report::TrustedSet;
use crate::verifier::RecordVerifier;

/// Reduces decoded records to the ones whose signatures verify.
///
/// Checks are independent of each other; the output always follows input
/// order, whichever execution strategy is used.
#[derive(Clone, Debug)]
pub struct TrustFilter {
    verifier: Arc<RecordVerifier>,
}

impl TrustFilter {
    pub fn new(verifier: RecordVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn verifier(&self) -> &RecordVerifier {
        &self.verifier
    }

    /// Verify records one after another on the calling thread.
    pub fn filter(&self, records: Vec<UserRecord>) -> TrustedSet {
        let verdicts: Vec<bool> = records.iter().map(|r| self.verifier.verify(r)).collect();
        TrustedSet::from_verdicts(records, verdicts)
    }

    /// Verify records on the blocking pool with at most `workers` checks in
    /// flight. Requires a Tokio runtime.
    ///
    /// A worker that dies counts as a failed check for its record only.
    pub async fn filter_concurrent(&self, records: Vec<UserRecord>, workers: usize) -> TrustedSet {
        let shared = Arc::new(records);

        let verdicts: Vec<bool> = stream::iter(0..shared.len())
            .map(|index| {
                let records = Arc::clone(&shared);
                let verifier = Arc::clone(&self.verifier);
                tokio::task::spawn_blocking(move || verifier.verify(&records[index]))
            })
            .buffered(workers.max(1))
            .enumerate()
            .map(|(index, joined)| match joined {
                Ok(ok) => ok,
                Err(e) => {
                    warn!(index, error = %e, "verification worker failed; rejecting record");
                    false
                }
            })
            .collect()
            .await;

        let records = Arc::try_unwrap(shared).unwrap_or_else(|arc| arc.as_ref().clone());
        TrustedSet::from_verdicts(records, verdicts)
    }
}
