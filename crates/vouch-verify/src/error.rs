use thiserror::Error;

/// Batch-level verification failures.
///
/// A record that fails its signature check is not an error; it is simply
/// left out of the [`TrustedSet`](crate::TrustedSet).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("failed to decode batch: {0}")]
    Decode(#[from] vouch_protocol::DecodeError),

    #[error("unusable public key: {0}")]
    InvalidPublicKey(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
