use async_trait::async_trait;
use thiserror::Error;

mod json;
pub use json::*;

use medley_core::{Playlist, SourceTag};

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Persisting to the backing storage failed. The triggering mutation
    /// must not be reported as successful.
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// A stored user account
#[derive(Debug, Clone)]
pub struct UserData {
    pub username: String,
    /// The hashed password credential, opaque outside [crate::Auth]
    pub password: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// One user's playlists in canonical form, tagged with the location that
/// held them so writes can target the same place.
#[derive(Debug, Clone)]
pub struct ResolvedPlaylists {
    pub source: SourceTag,
    pub playlists: Vec<Playlist>,
}

/// Represents a type that can load and persist medley data
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;

    /// Locates the user's playlists among the storage locations this
    /// deployment may use. Probing order is fixed, the first location
    /// holding an array-shaped entry for the user wins, and a location
    /// with malformed data counts as absent. Never fails, a user without
    /// data gets an empty collection with the default tag.
    async fn resolve_playlists(&self, username: &str) -> ResolvedPlaylists;

    /// Replaces the user's entire stored collection at exactly the
    /// location `source` denotes, leaving sibling data there untouched.
    async fn save_playlists(
        &self,
        username: &str,
        source: SourceTag,
        playlists: &[Playlist],
    ) -> Result<()>;
}
