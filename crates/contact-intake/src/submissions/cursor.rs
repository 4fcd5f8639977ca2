use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::domain::{SubmissionId, SubmissionKey};

/// Opaque continuation token marking the last key a scan page returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
    pub id: String,
    pub timestamp: String,
}

/// Why a client-supplied cursor could not be read back.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("pagination token is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("pagination token does not describe a scan position")]
    Format(#[from] serde_json::Error),
}

impl ScanCursor {
    /// URL-safe unpadded base64 over the canonical JSON form of the key, usable as a raw
    /// query parameter value.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = BASE64.decode(token.trim())?;
        let cursor = serde_json::from_slice(&bytes)?;
        Ok(cursor)
    }

    pub fn into_key(self) -> SubmissionKey {
        SubmissionKey {
            id: SubmissionId(self.id),
            timestamp: self.timestamp,
        }
    }
}

impl From<&SubmissionKey> for ScanCursor {
    fn from(key: &SubmissionKey) -> Self {
        Self {
            id: key.id.0.clone(),
            timestamp: key.timestamp.clone(),
        }
    }
}
