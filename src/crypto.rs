//! Client-side paste encryption.
//!
//! Content is sealed with AES-256-GCM under a random 256-bit key. The key is
//! only ever carried in a [`Locator`](crate::locator::Locator) fragment, so
//! the stored record is useless without it.
//!
//! Stored ciphertext is standard base64 of `nonce || ciphertext || tag`.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("no secure random source available")]
    RandomUnavailable,
    #[error("invalid key: expected 32 bytes of url-safe base64")]
    InvalidKey,
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("ciphertext is malformed")]
    Malformed,
    #[error("decryption failed - the key is wrong or the content is corrupted")]
    DecryptionFailed,
}

/// Symmetric key for a single paste. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PasteKey([u8; KEY_LEN]);

impl PasteKey {
    /// Draw a fresh key from the operating system's CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| CryptoError::RandomUnavailable)?;
        Ok(PasteKey(bytes))
    }

    /// Parse the fragment form produced by [`PasteKey::encode`].
    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKey)?;
        let result = <[u8; KEY_LEN]>::try_from(decoded.as_slice())
            .map(PasteKey)
            .map_err(|_| CryptoError::InvalidKey);
        decoded.zeroize();
        result
    }

    /// Unpadded url-safe base64, fit for a URL fragment.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl From<[u8; KEY_LEN]> for PasteKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        PasteKey(bytes)
    }
}

impl fmt::Debug for PasteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasteKey(<redacted>)")
    }
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(plaintext: &str, key: &PasteKey) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::RandomUnavailable)?;

    let sealed = key
        .cipher()
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(STANDARD.encode(out))
}

/// Inverse of [`encrypt`].
pub fn decrypt(ciphertext: &str, key: &PasteKey) -> Result<String, CryptoError> {
    let raw = STANDARD
        .decode(ciphertext.trim())
        .map_err(|_| CryptoError::Malformed)?;
    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Malformed);
    }

    let (nonce, sealed) = raw.split_at(NONCE_LEN);
    let plaintext = key
        .cipher()
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|err| {
        let mut bytes = err.into_bytes();
        bytes.zeroize();
        CryptoError::DecryptionFailed
    })
}
