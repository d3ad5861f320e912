//! URL-safe base64 framing for cursors.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::CursorTransform;
use crate::error::{CursorError, MAX_CURSOR_SIZE};

/// URL-safe, unpadded base64 framing.
///
/// Makes keyset cursors (raw JSON) safe to put in URLs. Not a security
/// mechanism: anyone can decode it.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)]
pub struct Base64Cursor;

impl CursorTransform for Base64Cursor {
    fn encode(&self, cursor: &str) -> Result<String, CursorError> {
        Ok(URL_SAFE_NO_PAD.encode(cursor))
    }

    fn decode(&self, cursor: &str) -> Result<String, CursorError> {
        if cursor.len() > MAX_CURSOR_SIZE {
            return Err(CursorError::TooLarge);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidBase64)?;
        String::from_utf8(bytes).map_err(|e| CursorError::InvalidFormat(e.to_string()))
    }
}
