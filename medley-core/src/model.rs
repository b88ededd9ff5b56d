use serde::{Deserialize, Serialize};

/// A single saved item in a playlist. Either a remote video or an
/// uploaded local audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    /// Source-specific identifier, unique within one playlist
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    /// Display string such as `4:05`, empty when unknown
    #[serde(default)]
    pub duration: String,
    /// Display string such as `1,234,567`
    #[serde(default)]
    pub views: String,
    #[serde(default)]
    pub rating: f64,
    /// Milliseconds since the epoch
    pub added_at: i64,
    /// True for an uploaded audio file rather than a remote video
    #[serde(default)]
    pub is_local: bool,
    /// Where the uploaded file is served from, only present when `is_local`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// A named, ordered sequence of videos belonging to one user.
/// The stored order of `videos` is the canonical base order, display
/// ordering is derived from it per view and never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Opaque token, stable across renames and never reused
    pub id: String,
    pub name: String,
    /// Milliseconds since the epoch
    pub created_at: i64,
    pub videos: Vec<VideoEntry>,
}

impl VideoEntry {
    /// Returns the stored thumbnail, deriving one for remote videos that
    /// were saved without it.
    pub fn display_thumbnail(&self) -> String {
        if !self.thumbnail.is_empty() || self.is_local {
            return self.thumbnail.clone();
        }

        format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", self.video_id)
    }
}

impl Playlist {
    pub fn contains_video(&self, video_id: &str) -> bool {
        self.videos.iter().any(|v| v.video_id == video_id)
    }
}
