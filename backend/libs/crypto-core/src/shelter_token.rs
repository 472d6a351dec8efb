/// Shelter registration number tokens
///
/// Shelter registration numbers issued by the animal protection registry are
/// not meant to appear verbatim in public URLs. This module wraps them in an
/// AES-256-GCM envelope and renders the result as URL-safe base64.
///
/// ## Token Format
///
/// `base64url_no_pad( nonce (12 bytes) || ciphertext || tag (16 bytes) )`
///
/// The key is the SHA-256 digest of a server-side secret. A fresh random nonce
/// is drawn for every call to [`ShelterTokenCodec::encode`], so encoding the
/// same registration number twice yields two different tokens which both
/// decode back to the original value.
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::engine::{general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use thiserror::Error;

use crate::hash::sha256;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Shortest byte length a well-formed token can decode to.
pub const MIN_TOKEN_BYTES: usize = NONCE_LEN + TAG_LEN;

#[derive(Debug, Error)]
pub enum TokenCodecError {
    #[error("shelter token secret is not configured")]
    MissingSecret,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Encrypts and decrypts shelter registration numbers.
#[derive(Clone)]
pub struct ShelterTokenCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for ShelterTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelterTokenCodec")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

impl ShelterTokenCodec {
    /// Derive the cipher key from `secret` (hashed with SHA-256).
    pub fn new(secret: &str) -> Result<Self, TokenCodecError> {
        if secret.trim().is_empty() {
            return Err(TokenCodecError::MissingSecret);
        }

        let digest = sha256(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);

        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Encrypt `plaintext` into a URL-safe token.
    pub fn encode(&self, plaintext: &str) -> Result<String, TokenCodecError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::thread_rng().gen();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, Payload::from(plaintext.as_bytes()))
            .map_err(|e| TokenCodecError::EncryptionFailed(format!("AES-GCM failed: {}", e)))?;

        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Recover the plaintext behind `token`.
    ///
    /// Returns `None` for anything that is not a token produced by this key:
    /// empty input, invalid base64url, truncated data, a failed tag check or
    /// non UTF-8 plaintext.
    pub fn decode(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
        if raw.len() < MIN_TOKEN_BYTES {
            return None;
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), Payload::from(ciphertext))
            .ok()?;

        String::from_utf8(plaintext).ok()
    }
}
