use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use tracing::{debug, info, warn};

use crate::error::{KeyInitError, SignError};
use crate::keys::{Signature, SigningKey, VerifyingKey};

/// Default key directory, relative to the working directory.
pub const DEFAULT_KEY_DIR: &str = "keys";
/// PKCS#8 PEM private key file name.
pub const PRIVATE_KEY_FILE: &str = "private.pem";
/// SPKI PEM public key file name.
pub const PUBLIC_KEY_FILE: &str = "public.pem";

#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;
#[cfg(unix)]
const PUBLIC_MODE: u32 = 0o644;

/// Where a key pair lives on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyLocations {
    pub dir: PathBuf,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl KeyLocations {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            private_key: dir.join(PRIVATE_KEY_FILE),
            public_key: dir.join(PUBLIC_KEY_FILE),
            dir,
        }
    }
}

impl Default for KeyLocations {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_DIR)
    }
}

/// A loaded Ed25519 key pair and the PEM text of its public half.
pub struct KeyPair {
    signing: SigningKey,
    verifying: VerifyingKey,
    public_pem: String,
}

impl KeyPair {
    fn from_signing(signing: SigningKey) -> Result<Self, KeyInitError> {
        let verifying = signing.verifying_key();
        let public_pem = verifying
            .to_pem()
            .map_err(|e| KeyInitError::Encode(e.to_string()))?;
        Ok(Self {
            signing,
            verifying,
            public_pem,
        })
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("signing", &self.signing)
            .field("verifying", &self.verifying.fingerprint())
            .finish()
    }
}

/// Owns the process's signing key pair.
///
/// Construct once at startup with [`KeyManager::open`] and share it (e.g. in
/// an `Arc`). After initialization the key material is read-only, so signing
/// and verification need no further synchronization.
///
/// The key directory is assumed to belong to a single process. Two processes
/// initializing the same empty directory at once may race; this is not
/// guarded.
pub struct KeyManager {
    locations: KeyLocations,
    pair: OnceLock<KeyPair>,
}

impl KeyManager {
    /// Create an uninitialized manager for `dir`. Nothing touches disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            locations: KeyLocations::new(dir),
            pair: OnceLock::new(),
        }
    }

    /// Create and initialize in one step.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, KeyInitError> {
        let manager = Self::new(dir);
        manager.initialize()?;
        Ok(manager)
    }

    /// Load the key pair from disk, or generate and persist a fresh one.
    ///
    /// Idempotent: once a pair is held, later calls return it untouched, and
    /// a directory holding valid key files is never regenerated.
    pub fn initialize(&self) -> Result<&KeyPair, KeyInitError> {
        if let Some(pair) = self.pair.get() {
            return Ok(pair);
        }
        let pair = load_or_generate(&self.locations)?;
        Ok(self.pair.get_or_init(|| pair))
    }

    pub fn is_initialized(&self) -> bool {
        self.pair.get().is_some()
    }

    pub fn locations(&self) -> &KeyLocations {
        &self.locations
    }

    fn pair(&self) -> Result<&KeyPair, SignError> {
        self.pair.get().ok_or(SignError::KeyUnavailable)
    }

    /// The public key as SPKI PEM. Identical bytes for the process lifetime.
    pub fn public_key_pem(&self) -> Result<&str, SignError> {
        Ok(self.pair()?.public_key_pem())
    }

    pub fn verifying_key(&self) -> Result<&VerifyingKey, SignError> {
        Ok(self.pair()?.verifying_key())
    }

    /// Sign raw hash bytes with the held private key.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, SignError> {
        Ok(self.pair()?.signing.sign(hash))
    }

    /// Check a base64 signature over `hash` against a PEM public key.
    ///
    /// Malformed key or signature input yields `false`, never an error.
    pub fn verify(hash: &[u8], signature_b64: &str, public_key_pem: &str) -> bool {
        match VerifyingKey::from_pem(public_key_pem) {
            Ok(key) => key.verify_base64(hash, signature_b64),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("dir", &self.locations.dir)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn load_or_generate(locations: &KeyLocations) -> Result<KeyPair, KeyInitError> {
    fs::create_dir_all(&locations.dir).map_err(KeyInitError::io(&locations.dir))?;

    let has_private = exists(&locations.private_key)?;
    let has_public = exists(&locations.public_key)?;

    match (has_private, has_public) {
        (true, true) => {
            let pair = load_private(&locations.private_key)?;
            let public_pem = fs::read_to_string(&locations.public_key)
                .map_err(KeyInitError::io(&locations.public_key))?;
            let stored = VerifyingKey::from_pem(&public_pem).map_err(|e| {
                KeyInitError::InvalidPublicKey {
                    path: locations.public_key.clone(),
                    reason: e.to_string(),
                }
            })?;
            if stored != pair.verifying {
                return Err(KeyInitError::Mismatch {
                    path: locations.public_key.clone(),
                });
            }
            restrict_permissions(&locations.private_key, PermissionKind::Private)?;
            info!(
                dir = %locations.dir.display(),
                fingerprint = %pair.verifying.fingerprint(),
                "loaded signing key pair"
            );
            Ok(pair)
        }
        (true, false) => {
            let pair = load_private(&locations.private_key)?;
            restrict_permissions(&locations.private_key, PermissionKind::Private)?;
            write_public(&locations.public_key, &pair)?;
            warn!(
                path = %locations.public_key.display(),
                "public key file missing; rewrote it from the private key"
            );
            Ok(pair)
        }
        _ => {
            let pair = KeyPair::from_signing(SigningKey::generate())?;
            write_private(&locations.private_key, &pair)?;
            write_public(&locations.public_key, &pair)?;
            info!(
                dir = %locations.dir.display(),
                fingerprint = %pair.verifying.fingerprint(),
                "generated new signing key pair"
            );
            Ok(pair)
        }
    }
}

fn exists(path: &Path) -> Result<bool, KeyInitError> {
    path.try_exists().map_err(KeyInitError::io(path))
}

fn load_private(path: &Path) -> Result<KeyPair, KeyInitError> {
    let pem = fs::read_to_string(path).map_err(KeyInitError::io(path))?;
    let signing = SigningKey::from_pkcs8_pem(&pem).map_err(|e| KeyInitError::InvalidPrivateKey {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    KeyPair::from_signing(signing)
}

fn write_private(path: &Path, pair: &KeyPair) -> Result<(), KeyInitError> {
    let pem = pair
        .signing
        .0
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyInitError::Encode(e.to_string()))?;

    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_MODE);
    }
    let mut file = options.open(path).map_err(KeyInitError::io(path))?;
    file.write_all(pem.as_bytes()).map_err(KeyInitError::io(path))?;
    file.sync_all().map_err(KeyInitError::io(path))?;

    // mode() only applies on creation; a pre-existing file keeps its bits.
    restrict_permissions(path, PermissionKind::Private)
}

fn write_public(path: &Path, pair: &KeyPair) -> Result<(), KeyInitError> {
    fs::write(path, pair.public_pem.as_bytes()).map_err(KeyInitError::io(path))?;
    restrict_permissions(path, PermissionKind::Public)
}

#[derive(Clone, Copy)]
enum PermissionKind {
    Private,
    Public,
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, kind: PermissionKind) -> Result<(), KeyInitError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match kind {
        PermissionKind::Private => PRIVATE_MODE,
        PermissionKind::Public => PUBLIC_MODE,
    };
    let current = fs::metadata(path).map_err(KeyInitError::io(path))?.permissions().mode() & 0o777;
    if current != mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(KeyInitError::io(path))?;
        debug!(
            path = %path.display(),
            from = %format_args!("{current:o}"),
            to = %format_args!("{mode:o}"),
            "fixed key file permissions"
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _kind: PermissionKind) -> Result<(), KeyInitError> {
    Ok(())
}
