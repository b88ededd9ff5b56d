use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tokio::fs;

use medley_core::{now_millis, random_string};

#[derive(Debug, Error)]
pub enum UploadError {
    /// No file content was supplied
    #[error("No file uploaded")]
    Empty,
    #[error("Failed to store upload: {0}")]
    WriteFailed(String),
}

/// A stored upload, addressable by the path it is served from
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub stored_path: String,
    pub original_name: String,
}

/// Stores uploaded audio files under the uploads directory, giving each
/// a collision-free name while keeping the original one recognizable.
pub struct UploadStore {
    uploads_dir: PathBuf,
}

impl UploadStore {
    pub async fn new(uploads_dir: impl AsRef<Path>) -> Result<Self, UploadError> {
        let uploads_dir = uploads_dir.as_ref().to_path_buf();

        fs::create_dir_all(&uploads_dir)
            .await
            .map_err(|e| UploadError::WriteFailed(e.to_string()))?;

        Ok(Self { uploads_dir })
    }

    pub async fn store(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let file_name = format!(
            "{}-{}-{}",
            now_millis(),
            random_string(8),
            sanitize_file_name(original_name)
        );

        fs::write(self.uploads_dir.join(&file_name), bytes)
            .await
            .map_err(|e| UploadError::WriteFailed(e.to_string()))?;

        Ok(StoredUpload {
            stored_path: format!("/uploads/{file_name}"),
            original_name: original_name.to_string(),
        })
    }
}

impl StoredUpload {
    /// Builds the raw record an uploaded file enters a playlist as. It
    /// goes through normalization like any other record.
    pub fn as_video_record(&self) -> Value {
        json!({
            "videoId": format!("local_{}", now_millis()),
            "title": self.original_name.trim_end_matches(".mp3"),
            "thumbnail": "",
            "duration": "MP3",
            "isLocal": true,
            "filePath": self.stored_path,
            "addedAt": now_millis(),
        })
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload.mp3".to_string()
    } else {
        cleaned
    }
}
