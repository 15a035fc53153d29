use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or creating the key pair at startup.
///
/// Fatal: a process that cannot initialize its keys cannot serve signed data.
#[derive(Debug, Error)]
pub enum KeyInitError {
    #[error("key storage I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid private key in {}: {reason}", path.display())]
    InvalidPrivateKey { path: PathBuf, reason: String },

    #[error("invalid public key in {}: {reason}", path.display())]
    InvalidPublicKey { path: PathBuf, reason: String },

    #[error("public key in {} does not belong to the private key", path.display())]
    Mismatch { path: PathBuf },

    #[error("key encoding failed: {0}")]
    Encode(String),
}

impl KeyInitError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Errors from signing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    #[error("signing key unavailable: key manager was never initialized")]
    KeyUnavailable,
}

/// Errors from signature and key parsing or verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidEncoding(String),
}
