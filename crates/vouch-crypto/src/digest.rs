use sha2::{Digest, Sha384};
use vouch_types::canonical_email;

/// Length of a SHA-384 digest in bytes.
pub const DIGEST_LEN: usize = 48;

/// SHA-384 digest of a canonical email.
///
/// The hashed bytes are exactly the UTF-8 encoding of
/// [`canonical_email`]: no padding, no length prefix, no domain tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmailDigest([u8; DIGEST_LEN]);

impl EmailDigest {
    /// Canonicalize `email` and hash it.
    pub fn of(email: &str) -> Self {
        Self::of_bytes(canonical_email(email).as_bytes())
    }

    /// Hash raw bytes, without canonicalization.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&Sha384::digest(data));
        Self(out)
    }

    /// Parse a lowercase or uppercase hex digest.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex, 96 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for EmailDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmailDigest({}...)", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for EmailDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
