use base64::Engine;
use serde::Deserialize;

use crate::source::FetchError;

/// Location of the flag file inside a remote repository.
/// Built once at startup from config/env/CLI and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RepoLocation {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch (ref) to read the file from
    pub branch: String,
    /// Path of the flag file within the repository
    pub file_path: String,
}

/// JSON payload returned by the GitHub contents API for a single file.
#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    /// Base64-encoded file content, hard-wrapped with newlines by the API
    pub content: String,
    /// Encoding of the content field; "base64" for regular files
    pub encoding: String,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
}

impl ContentResponse {
    /// Decode the content field into trimmed UTF-8 text.
    /// The contents API wraps the base64 in newlines, so whitespace is
    /// stripped before decoding.
    pub fn decode_text(&self) -> Result<String, FetchError> {
        if self.encoding != "base64" {
            return Err(FetchError::Decode(format!(
                "unexpected encoding '{}'",
                self.encoding
            )));
        }

        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let text =
            String::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(text.trim().to_string())
    }
}
