//! Foundation types for vouch.
//!
//! Every other vouch crate depends on `vouch-types`. It defines the signed
//! user record that crosses the trust boundary and the validated inputs the
//! signing side turns into records.
//!
//! # Key Types
//!
//! - [`UserRecord`]: a user with its email hash and signature attached
//! - [`Seal`]: canonical email, hash, and signature produced together
//! - [`Status`]: account status (`active` / `inactive`)
//! - [`NewUser`] / [`UserPatch`]: unvalidated create and update inputs

pub mod email;
pub mod error;
pub mod input;
pub mod record;

pub use email::{canonical_email, parse_email};
pub use error::{TypeError, TypeResult};
pub use input::{parse_role, NewUser, UserDraft, UserPatch, ValidPatch, ROLES};
pub use record::{Seal, Status, UserRecord};
