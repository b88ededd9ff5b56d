use std::{env, path::PathBuf};

/// Configuration for a medley library instance
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the storage files
    pub data_dir: PathBuf,
    /// Directory uploaded audio files are stored in and served from
    pub uploads_dir: PathBuf,
    /// API key for text search. Pasting video links works without one.
    pub youtube_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            uploads_dir: PathBuf::from("uploads"),
            youtube_api_key: env::var("MEDLEY_YOUTUBE_API_KEY").ok(),
        }
    }
}
