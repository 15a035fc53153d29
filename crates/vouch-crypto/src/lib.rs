//! Cryptographic core for vouch.
//!
//! Provides the Ed25519 key lifecycle ([`KeyManager`]), the canonical email
//! digest ([`EmailDigest`], SHA-384), and record sealing ([`RecordSigner`]).
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod digest;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod signer;

pub use digest::{EmailDigest, DIGEST_LEN};
pub use error::{KeyInitError, SignError, SignatureError};
pub use keys::{Signature, SigningKey, VerifyingKey, SIGNATURE_LEN};
pub use keystore::{
    KeyLocations, KeyManager, KeyPair, DEFAULT_KEY_DIR, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE,
};
pub use signer::RecordSigner;
