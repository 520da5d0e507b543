//! Cover letter export: the downloadable file payload and its naming rules.

use std::path::{Path, PathBuf};

use bytes::Bytes;

/// A downloadable cover letter as returned by the export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl CoverLetterFile {
    /// Builds the payload locally, without a round-trip to the service.
    pub fn from_text(cover_letter: &str, full_name: &str) -> Self {
        Self {
            file_name: cover_letter_file_name(full_name),
            content_type: "text/plain".to_string(),
            bytes: Bytes::copy_from_slice(cover_letter.as_bytes()),
        }
    }

    /// Writes the file into `dir` and returns the full path.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// `Cover_Letter_<name>.txt`, with every non-alphanumeric character of the name
/// replaced by `_`.
pub fn cover_letter_file_name(full_name: &str) -> String {
    let safe: String = full_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("Cover_Letter_{safe}.txt")
}

/// Pulls `filename=...` out of a `Content-Disposition` header value.
pub fn file_name_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
