use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use medley_core::{AddVideoOutcome, Collection, CollectionError, Confirmation, Playlist};

use crate::{Storage, StorageError};

/// Runs playlist mutations as normalize-then-persist cycles. Every
/// mutation that changes canonical state is written through to the
/// collection's resolved storage location before success is reported, so
/// an `Ok` here means the new state is durable.
pub struct PlaylistManager<S> {
    storage: Arc<S>,
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Rejected user input, surfaced for re-entry
    #[error(transparent)]
    Collection(#[from] CollectionError),
    /// The collection could not be persisted, the mutation is not durable
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl<S> PlaylistManager<S>
where
    S: Storage,
{
    pub fn new(storage: &Arc<S>) -> Self {
        Self {
            storage: storage.clone(),
        }
    }

    /// Loads and normalizes the user's collection from whichever storage
    /// location holds it. The first playlist starts out selected.
    pub async fn collection(&self, username: &str) -> Collection {
        let resolved = self.storage.resolve_playlists(username).await;

        Collection::new(username, resolved.source, resolved.playlists)
    }

    pub async fn create_playlist(
        &self,
        collection: &mut Collection,
        name: &str,
    ) -> Result<Playlist, PlaylistError> {
        let playlist = collection.create_playlist(name)?.clone();
        self.persist(collection).await?;

        Ok(playlist)
    }

    /// Deletes a playlist once the caller confirms. A cancelled
    /// confirmation or an unknown id leaves everything untouched.
    pub async fn delete_playlist(
        &self,
        collection: &mut Collection,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, PlaylistError> {
        if !collection.delete_playlist(id, confirmation) {
            return Ok(false);
        }

        self.persist(collection).await?;
        Ok(true)
    }

    pub async fn add_video(
        &self,
        collection: &mut Collection,
        playlist_id: &str,
        raw: &Value,
    ) -> Result<AddVideoOutcome, PlaylistError> {
        let outcome = collection.add_video(playlist_id, raw);

        if matches!(outcome, AddVideoOutcome::Added(_)) {
            self.persist(collection).await?;
        }

        Ok(outcome)
    }

    /// Removes all entries matching the video id, returning how many were
    /// removed. Unknown playlist or video ids are harmless no-ops.
    pub async fn remove_video(
        &self,
        collection: &mut Collection,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<usize, PlaylistError> {
        let removed = collection.remove_video(playlist_id, video_id);

        if collection.playlist(playlist_id).is_some() {
            self.persist(collection).await?;
        }

        Ok(removed)
    }

    async fn persist(&self, collection: &Collection) -> Result<(), StorageError> {
        self.storage
            .save_playlists(&collection.username, collection.source, &collection.playlists)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::JsonFileStore;
    use medley_core::SourceTag;
    use serde_json::json;
    use tempfile::TempDir;

    async fn manager() -> (TempDir, PlaylistManager<JsonFileStore>) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(JsonFileStore::new(dir.path()).await.unwrap());

        (dir, PlaylistManager::new(&storage))
    }

    #[tokio::test]
    async fn test_mutations_are_durable() {
        let (_dir, manager) = manager().await;

        let mut collection = manager.collection("alice").await;
        let playlist = manager
            .create_playlist(&mut collection, "Road Trip")
            .await
            .unwrap();

        manager
            .add_video(
                &mut collection,
                &playlist.id,
                &json!({ "videoId": "v1", "title": "Song A" }),
            )
            .await
            .unwrap();

        // A fresh load sees everything the mutations reported as done
        let reloaded = manager.collection("alice").await;

        assert_eq!(reloaded.source, SourceTag::PlaylistMap);
        assert_eq!(reloaded.playlists.len(), 1);
        assert_eq!(reloaded.playlists[0].name, "Road Trip");
        assert_eq!(reloaded.playlists[0].videos[0].video_id, "v1");
        assert_eq!(reloaded.active.as_deref(), Some(playlist.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_add_is_not_persisted_twice() {
        let (_dir, manager) = manager().await;

        let mut collection = manager.collection("alice").await;
        let id = manager
            .create_playlist(&mut collection, "Mix")
            .await
            .unwrap()
            .id;

        let record = json!({ "videoId": "v1", "title": "Song A" });

        let first = manager.add_video(&mut collection, &id, &record).await.unwrap();
        let second = manager.add_video(&mut collection, &id, &record).await.unwrap();

        assert!(matches!(first, AddVideoOutcome::Added(_)));
        assert_eq!(second, AddVideoOutcome::AlreadyPresent);

        let reloaded = manager.collection("alice").await;
        assert_eq!(reloaded.playlists[0].videos.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_persists_and_reselects() {
        let (_dir, manager) = manager().await;

        let mut collection = manager.collection("alice").await;
        manager.create_playlist(&mut collection, "P2").await.unwrap();
        let p1 = manager.create_playlist(&mut collection, "P1").await.unwrap();

        let deleted = manager
            .delete_playlist(&mut collection, &p1.id, Confirmation::Confirmed)
            .await
            .unwrap();
        assert!(deleted);

        let reloaded = manager.collection("alice").await;
        assert_eq!(reloaded.playlists.len(), 1);
        assert_eq!(reloaded.playlists[0].name, "P2");
    }

    #[tokio::test]
    async fn test_cancelled_delete_changes_nothing() {
        let (_dir, manager) = manager().await;

        let mut collection = manager.collection("alice").await;
        let id = manager
            .create_playlist(&mut collection, "Keep me")
            .await
            .unwrap()
            .id;

        let deleted = manager
            .delete_playlist(&mut collection, &id, Confirmation::Cancelled)
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(manager.collection("alice").await.playlists.len(), 1);
    }
}
