mod auth;
mod config;
mod playlists;
mod search;
mod store;
mod upload;

pub use auth::*;
pub use config::*;
pub use playlists::*;
pub use search::*;
pub use store::*;
pub use upload::*;

use std::sync::Arc;

/// The medley library system, facilitating playlist management,
/// authentication, video search, and uploads.
pub struct Library<S> {
    pub auth: Auth<S>,
    pub playlists: PlaylistManager<S>,
    pub search: VideoSearch,
    pub uploads: UploadStore,
}

impl Library<JsonFileStore> {
    /// Creates a library backed by JSON files, per the config
    pub async fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(JsonFileStore::new(&config.data_dir).await?);

        let uploads = UploadStore::new(&config.uploads_dir)
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        Ok(Self {
            auth: Auth::new(&storage),
            playlists: PlaylistManager::new(&storage),
            search: VideoSearch::new(config.youtube_api_key),
            uploads,
        })
    }
}
