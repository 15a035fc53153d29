//! Wire format for vouch.
//!
//! Defines the protobuf messages (`User`, `Batch`) a signing server exports
//! and a verifying client decodes, the codec between them and
//! [`vouch_types::UserRecord`], and the HTTP endpoint contract.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use codec::{BatchCodec, DecodedBatch};
pub use endpoint::{content_types, endpoints, HealthResponse};
pub use error::{DecodeError, DecodeResult, FieldError};
pub use message::{Batch, User, MAX_BATCH_SIZE, SCHEMA};
