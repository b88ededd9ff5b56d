use serde_json::Value;
use thiserror::Error;

use crate::{
    normalize_video,
    util::{generate_playlist_id, now_millis},
    Playlist, VideoEntry,
};

/// Identifies which storage location a user's playlists were loaded from.
/// Any later write must be handed the same tag, so it lands where the
/// read came from instead of forking the data into a second location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceTag {
    /// The standalone username to playlists mapping
    #[default]
    PlaylistMap,
    /// A `playlists` array embedded in the user's registry record
    UserRegistry,
}

#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    /// The playlist name was empty after trimming
    #[error("Playlist name is required")]
    EmptyName,
    /// Another playlist in the collection already uses this name
    #[error("A playlist named \"{0}\" already exists")]
    DuplicateName(String),
}

/// A caller-supplied signal for destructive operations. The interface in
/// front of the core is expected to ask the user before confirming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// What happened when a video was added to a playlist. Both non-added
/// cases are deliberate no-ops rather than failures.
#[derive(Debug, Clone, PartialEq)]
pub enum AddVideoOutcome {
    Added(VideoEntry),
    /// The playlist already has an entry with this video id
    AlreadyPresent,
    /// No playlist with the given id exists
    UnknownPlaylist,
}

/// A user's entire playlist collection in canonical form, along with the
/// explicit selection state a render needs. Mutations here are pure,
/// persistence is layered on top by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub username: String,
    /// Where this collection was loaded from, and where it saves to
    pub source: SourceTag,
    /// Newest playlist first
    pub playlists: Vec<Playlist>,
    /// Id of the currently selected playlist, if any
    pub active: Option<String>,
}

impl Collection {
    pub fn new(username: impl Into<String>, source: SourceTag, playlists: Vec<Playlist>) -> Self {
        let active = playlists.first().map(|playlist| playlist.id.clone());

        Self {
            username: username.into(),
            source,
            playlists,
            active,
        }
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|playlist| playlist.id == id)
    }

    pub fn playlist_mut(&mut self, id: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|playlist| playlist.id == id)
    }

    pub fn active_playlist(&self) -> Option<&Playlist> {
        self.active.as_deref().and_then(|id| self.playlist(id))
    }

    /// Creates a playlist with a fresh id and makes it the active one.
    /// New playlists go to the front of the collection.
    pub fn create_playlist(&mut self, name: &str) -> Result<&Playlist, CollectionError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(CollectionError::EmptyName);
        }

        let duplicate = self
            .playlists
            .iter()
            .any(|playlist| playlist.name.eq_ignore_ascii_case(name));

        if duplicate {
            return Err(CollectionError::DuplicateName(name.to_string()));
        }

        let playlist = Playlist {
            id: generate_playlist_id(),
            name: name.to_string(),
            created_at: now_millis(),
            videos: Vec::new(),
        };

        self.active = Some(playlist.id.clone());
        self.playlists.insert(0, playlist);

        Ok(&self.playlists[0])
    }

    /// Removes a playlist. An unknown id or a cancelled confirmation is a
    /// no-op. When the active playlist is deleted, selection falls to the
    /// first remaining playlist.
    pub fn delete_playlist(&mut self, id: &str, confirmation: Confirmation) -> bool {
        if confirmation == Confirmation::Cancelled {
            return false;
        }

        let Some(index) = self.playlists.iter().position(|playlist| playlist.id == id) else {
            return false;
        };

        self.playlists.remove(index);

        if self.active.as_deref() == Some(id) {
            self.active = self.playlists.first().map(|playlist| playlist.id.clone());
        }

        true
    }

    /// Normalizes a raw record and appends it to the target playlist,
    /// unless an entry with the same video id is already there.
    pub fn add_video(&mut self, playlist_id: &str, raw: &Value) -> AddVideoOutcome {
        let Some(playlist) = self.playlist_mut(playlist_id) else {
            return AddVideoOutcome::UnknownPlaylist;
        };

        let entry = normalize_video(raw);

        if playlist.contains_video(&entry.video_id) {
            return AddVideoOutcome::AlreadyPresent;
        }

        playlist.videos.push(entry.clone());
        AddVideoOutcome::Added(entry)
    }

    /// Removes every entry matching the video id from the target playlist,
    /// returning how many were removed. Unknown ids remove nothing.
    pub fn remove_video(&mut self, playlist_id: &str, video_id: &str) -> usize {
        let Some(playlist) = self.playlist_mut(playlist_id) else {
            return 0;
        };

        let before = playlist.videos.len();
        playlist.videos.retain(|video| video.video_id != video_id);

        before - playlist.videos.len()
    }
}
