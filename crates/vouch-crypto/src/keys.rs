use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};

use crate::error::SignatureError;

/// Raw Ed25519 signature length.
pub const SIGNATURE_LEN: usize = 64;

/// Ed25519 signing key (private). Never serialized, never logged.
pub struct SigningKey(pub(crate) ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// Parse a PKCS#8 PEM private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, SignatureError> {
        ed25519_dalek::SigningKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))
    }

    /// The corresponding public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }
}

impl VerifyingKey {
    /// Verify a signature on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// Verify a base64 signature. Any decoding or verification failure is `false`.
    pub fn verify_base64(&self, message: &[u8], signature_b64: &str) -> bool {
        match Signature::from_base64(signature_b64) {
            Ok(sig) => self.verify(message, &sig).is_ok(),
            Err(_) => false,
        }
    }

    /// Parse an SPKI PEM public key. Surrounding whitespace is ignored.
    pub fn from_pem(pem: &str) -> Result<Self, SignatureError> {
        let normalized = format!("{}\n", pem.trim());
        ed25519_dalek::VerifyingKey::from_public_key_pem(&normalized)
            .map(Self)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))
    }

    /// SPKI PEM encoding with LF line endings.
    pub fn to_pem(&self) -> Result<String, SignatureError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Create from raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, SignatureError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        Ok(Self(key))
    }

    /// Short hex fingerprint for logs and CLI output.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0.to_bytes()[..8])
    }
}

impl Signature {
    /// Standard base64 (with padding) of the 64 raw bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.to_bytes())
    }

    /// Parse a standard base64 signature of exactly 64 bytes.
    pub fn from_base64(s: &str) -> Result<Self, SignatureError> {
        let bytes = STANDARD
            .decode(s.trim())
            .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            SignatureError::InvalidEncoding(format!("expected {SIGNATURE_LEN} bytes, got {}", b.len()))
        })?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&arr)))
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0.to_bytes()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.to_bytes()))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}
