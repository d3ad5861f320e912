//! AES-256-GCM cursor encryption.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use super::CursorTransform;
use crate::error::{CursorError, MAX_CURSOR_SIZE};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM cursor encryption.
///
/// Each cursor gets a fresh random 96-bit nonce; the output is URL-safe
/// base64 of `nonce || ciphertext || tag`. A cursor sealed under another key,
/// or altered in transit, fails to decode with [`CursorError::Decrypt`].
///
/// ```
/// use pagewise::wrap::{AesGcmCursor, CursorTransform};
///
/// let key = AesGcmCursor::new([42u8; 32]);
/// let sealed = key.encode(r#"{"id":7}"#).unwrap();
/// assert_eq!(key.decode(&sealed).unwrap(), r#"{"id":7}"#);
/// assert!(AesGcmCursor::new([0u8; 32]).decode(&sealed).is_err());
/// ```
#[derive(Clone)]
pub struct AesGcmCursor {
    cipher: Aes256Gcm,
}

impl AesGcmCursor {
    /// Cipher for a 32-byte key.
    #[must_use]
    pub fn new(key: [u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Cipher for a key given as a slice; it must be exactly 32 bytes.
    pub fn from_slice(key: &[u8]) -> Option<Self> {
        let key: [u8; 32] = key.try_into().ok()?;
        Some(Self::new(key))
    }
}

impl std::fmt::Debug for AesGcmCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCursor").finish_non_exhaustive()
    }
}

impl CursorTransform for AesGcmCursor {
    fn encode(&self, cursor: &str) -> Result<String, CursorError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), cursor.as_bytes())
            .map_err(|_| CursorError::Serialize("encrypt cursor".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn decode(&self, cursor: &str) -> Result<String, CursorError> {
        if cursor.len() > MAX_CURSOR_SIZE {
            return Err(CursorError::TooLarge);
        }
        let sealed = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidBase64)?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CursorError::Decrypt);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CursorError::Decrypt)?;
        String::from_utf8(plain).map_err(|e| CursorError::InvalidFormat(e.to_string()))
    }
}
