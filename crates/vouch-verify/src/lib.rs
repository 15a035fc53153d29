//! Consumer-side verification for vouch.
//!
//! A client receives two things from a signing server: an exported batch and
//! the server's public key. This crate turns them into a [`TrustedSet`]:
//!
//! 1. decode the batch ([`VerifyError::Decode`] if the bytes are not a
//!    well-formed batch; a record whose id or status does not parse is
//!    rejected on its own);
//! 2. for every record, recompute the SHA-384 digest from the raw email and
//!    check the record's signature over it with the public key;
//! 3. keep the records that pass, in decode order.
//!
//! The `emailHash` carried on the wire is never consulted. A record whose
//! stored hash was rewritten without re-signing verifies exactly as before,
//! and a record whose email was changed without re-signing fails.

pub mod error;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod verifier;

pub use error::{VerifyError, VerifyResult};
pub use filter::TrustFilter;
pub use pipeline::{trusted_set, trusted_set_concurrent, Decoded, Fetched, Stage};
pub use report::{RejectReason, Rejection, TrustedSet};
pub use verifier::RecordVerifier;
