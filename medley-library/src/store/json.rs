use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::warn;
use serde_json::{json, Value};
use tokio::{fs, sync::Mutex};

use medley_core::{normalize_playlist, Playlist, SourceTag};

use super::{NewUser, ResolvedPlaylists, Result, Storage, StorageError, UserData};

const USERS_FILE: &str = "users.json";
const PLAYLISTS_FILE: &str = "playlists.json";

/// A storage implementation over two JSON files in a data directory.
/// `playlists.json` holds a mapping from username to playlist array, and
/// `users.json` holds the account registry, whose records may still carry
/// an embedded `playlists` array written by older builds of the app.
pub struct JsonFileStore {
    users_path: PathBuf,
    playlists_path: PathBuf,
    /// Saves are whole-file read-modify-write cycles. The lock keeps them
    /// from interleaving within this process, concurrent processes remain
    /// last-writer-wins.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();

        fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        Ok(Self {
            users_path: data_dir.join(USERS_FILE),
            playlists_path: data_dir.join(PLAYLISTS_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// Reads and parses a storage file. A missing file is simply absent,
    /// and an unparseable one counts as absent too, it never raises.
    async fn read_json(&self, path: &Path) -> Option<Value> {
        let raw = fs::read_to_string(path).await.ok()?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn write_json(&self, path: &Path, value: &Value) -> Result<()> {
        let pretty = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        fs::write(path, pretty)
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }

    async fn user_records(&self) -> Vec<Value> {
        self.read_json(&self.users_path)
            .await
            .and_then(|value| value.as_array().cloned())
            .unwrap_or_default()
    }
}

/// Username comparison is case-insensitive everywhere
fn find_user_index(records: &[Value], username: &str) -> Option<usize> {
    records.iter().position(|record| {
        record
            .get("username")
            .and_then(Value::as_str)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(username))
    })
}

/// Reads a registry record into account data, tolerating the field names
/// older builds wrote.
fn user_from_record(record: &Value) -> Option<UserData> {
    let username = record.get("username")?.as_str()?.to_string();

    let display_name = ["displayName", "firstName"]
        .iter()
        .find_map(|key| record.get(key).and_then(Value::as_str))
        .unwrap_or(&username)
        .to_string();

    let avatar_url = ["avatarUrl", "imageUrl", "imgUrl"]
        .iter()
        .find_map(|key| record.get(key).and_then(Value::as_str))
        .map(str::to_string);

    Some(UserData {
        password: record
            .get("password")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        username,
        display_name,
        avatar_url,
    })
}

#[async_trait]
impl Storage for JsonFileStore {
    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        let records = self.user_records().await;

        find_user_index(&records, username)
            .and_then(|index| user_from_record(&records[index]))
            .ok_or(StorageError::NotFound {
                resource: "user",
                identifier: "username",
            })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.user_records().await;

        if find_user_index(&records, &new_user.username).is_some() {
            return Err(StorageError::Conflict {
                resource: "user",
                field: "username",
                value: new_user.username,
            });
        }

        records.push(json!({
            "username": new_user.username,
            "password": new_user.password,
            "displayName": new_user.display_name,
            "avatarUrl": new_user.avatar_url,
        }));

        self.write_json(&self.users_path, &Value::Array(records))
            .await?;

        Ok(UserData {
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
            avatar_url: new_user.avatar_url,
        })
    }

    async fn resolve_playlists(&self, username: &str) -> ResolvedPlaylists {
        // The standalone mapping is probed first
        if let Some(value) = self.read_json(&self.playlists_path).await {
            match value.as_object().and_then(|map| map.get(username)) {
                Some(Value::Array(entries)) => {
                    return ResolvedPlaylists {
                        source: SourceTag::PlaylistMap,
                        playlists: entries.iter().map(normalize_playlist).collect(),
                    }
                }
                Some(_) => {
                    warn!("Playlist entry for {username} is not an array, probing next location")
                }
                None => {}
            }
        }

        // Then the playlists embedded in the user registry
        let records = self.user_records().await;

        if let Some(index) = find_user_index(&records, username) {
            if let Some(Value::Array(entries)) = records[index].get("playlists") {
                return ResolvedPlaylists {
                    source: SourceTag::UserRegistry,
                    playlists: entries.iter().map(normalize_playlist).collect(),
                };
            }
        }

        ResolvedPlaylists {
            source: SourceTag::default(),
            playlists: Vec::new(),
        }
    }

    async fn save_playlists(
        &self,
        username: &str,
        source: SourceTag,
        playlists: &[Playlist],
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let serialized =
            serde_json::to_value(playlists).map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        match source {
            SourceTag::PlaylistMap => {
                let mut map = self
                    .read_json(&self.playlists_path)
                    .await
                    .and_then(|value| value.as_object().cloned())
                    .unwrap_or_default();

                map.insert(username.to_string(), serialized);

                self.write_json(&self.playlists_path, &Value::Object(map))
                    .await
            }
            SourceTag::UserRegistry => {
                let mut records = self.user_records().await;

                let index =
                    find_user_index(&records, username).ok_or(StorageError::NotFound {
                        resource: "user",
                        identifier: "username",
                    })?;

                if let Some(record) = records[index].as_object_mut() {
                    record.insert("playlists".to_string(), serialized);
                }

                self.write_json(&self.users_path, &Value::Array(records))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store_with(users: Option<Value>, playlists: Option<Value>) -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();

        if let Some(users) = users {
            std::fs::write(
                dir.path().join(USERS_FILE),
                serde_json::to_string(&users).unwrap(),
            )
            .unwrap();
        }

        if let Some(playlists) = playlists {
            std::fs::write(
                dir.path().join(PLAYLISTS_FILE),
                serde_json::to_string(&playlists).unwrap(),
            )
            .unwrap();
        }

        let store = JsonFileStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn playlist_record(id: &str, name: &str) -> Value {
        json!({ "id": id, "name": name, "createdAt": 1, "videos": [] })
    }

    #[tokio::test]
    async fn test_missing_data_resolves_to_default_location() {
        let (_dir, store) = store_with(None, None).await;

        let resolved = store.resolve_playlists("alice").await;

        assert_eq!(resolved.source, SourceTag::PlaylistMap);
        assert!(resolved.playlists.is_empty());
    }

    #[tokio::test]
    async fn test_standalone_mapping_wins_over_registry() {
        let (_dir, store) = store_with(
            Some(json!([{ "username": "alice", "playlists": [playlist_record("pl_2", "Embedded")] }])),
            Some(json!({ "alice": [playlist_record("pl_1", "Standalone")] })),
        )
        .await;

        let resolved = store.resolve_playlists("alice").await;

        assert_eq!(resolved.source, SourceTag::PlaylistMap);
        assert_eq!(resolved.playlists[0].name, "Standalone");
    }

    #[tokio::test]
    async fn test_malformed_primary_location_falls_through() {
        // A non-array entry in the primary location counts as absent
        let (_dir, store) = store_with(
            Some(json!([{ "username": "alice", "playlists": [playlist_record("pl_2", "Embedded")] }])),
            Some(json!({ "alice": "corrupted" })),
        )
        .await;

        let resolved = store.resolve_playlists("alice").await;

        assert_eq!(resolved.source, SourceTag::UserRegistry);
        assert_eq!(resolved.playlists[0].name, "Embedded");
    }

    #[tokio::test]
    async fn test_unparseable_file_falls_through() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PLAYLISTS_FILE), "{not json").unwrap();
        std::fs::write(
            dir.path().join(USERS_FILE),
            json!([{ "username": "alice", "playlists": [playlist_record("pl_2", "Embedded")] }])
                .to_string(),
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path()).await.unwrap();
        let resolved = store.resolve_playlists("alice").await;

        assert_eq!(resolved.source, SourceTag::UserRegistry);
    }

    #[tokio::test]
    async fn test_records_are_normalized_on_read() {
        let legacy = json!({
            "playlistId": "pl_old",
            "name": "Legacy",
            "createdAt": "2023-11-14T22:13:20Z",
            "videos": [{ "youtubeId": "v1", "thumb": "t.jpg", "savedAt": 7 }],
        });

        let (_dir, store) = store_with(None, Some(json!({ "alice": [legacy] }))).await;

        let resolved = store.resolve_playlists("alice").await;
        let playlist = &resolved.playlists[0];

        assert_eq!(playlist.id, "pl_old");
        assert_eq!(playlist.created_at, 1700000000000);
        assert_eq!(playlist.videos[0].video_id, "v1");
        assert_eq!(playlist.videos[0].thumbnail, "t.jpg");
        assert_eq!(playlist.videos[0].added_at, 7);
    }

    #[tokio::test]
    async fn test_write_location_affinity() {
        let (dir, store) = store_with(
            Some(json!([
                { "username": "alice", "playlists": [playlist_record("pl_1", "Mine")] },
                { "username": "bob", "playlists": [playlist_record("pl_9", "Bobs")] },
            ])),
            None,
        )
        .await;

        let resolved = store.resolve_playlists("alice").await;
        assert_eq!(resolved.source, SourceTag::UserRegistry);

        let mut playlists = resolved.playlists;
        playlists[0].name = "Renamed".to_string();

        store
            .save_playlists("alice", resolved.source, &playlists)
            .await
            .unwrap();

        // The write landed in the registry, not the standalone mapping
        assert!(!dir.path().join(PLAYLISTS_FILE).exists());

        let users: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(USERS_FILE)).unwrap())
                .unwrap();

        assert_eq!(users[0]["playlists"][0]["name"], "Renamed");
        // Sibling users are untouched
        assert_eq!(users[1]["playlists"][0]["name"], "Bobs");
    }

    #[tokio::test]
    async fn test_mapping_writes_preserve_siblings() {
        let (dir, store) = store_with(
            None,
            Some(json!({ "bob": [playlist_record("pl_9", "Bobs")] })),
        )
        .await;

        store
            .save_playlists("alice", SourceTag::PlaylistMap, &[])
            .await
            .unwrap();

        let map: Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(PLAYLISTS_FILE)).unwrap(),
        )
        .unwrap();

        assert_eq!(map["bob"][0]["name"], "Bobs");
        assert_eq!(map["alice"], json!([]));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let (_dir, store) = store_with(None, Some(json!({ "alice": [] }))).await;

        let first = store.resolve_playlists("alice").await;
        let second = store.resolve_playlists("alice").await;

        store
            .save_playlists("alice", first.source, &[normalize_playlist(&playlist_record("pl_1", "First"))])
            .await
            .unwrap();

        // The second session never saw pl_1, its save silently replaces it
        store
            .save_playlists("alice", second.source, &[normalize_playlist(&playlist_record("pl_2", "Second"))])
            .await
            .unwrap();

        let resolved = store.resolve_playlists("alice").await;
        assert_eq!(resolved.playlists.len(), 1);
        assert_eq!(resolved.playlists[0].name, "Second");
    }

    #[tokio::test]
    async fn test_create_user_rejects_existing_username_case_insensitively() {
        let (_dir, store) = store_with(None, None).await;

        let new_user = |username: &str| NewUser {
            username: username.to_string(),
            password: "hash".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
        };

        store.create_user(new_user("Alice")).await.unwrap();

        let conflict = store.create_user(new_user("alice")).await;
        assert!(matches!(conflict, Err(StorageError::Conflict { .. })));

        let found = store.user_by_username("ALICE").await.unwrap();
        assert_eq!(found.username, "Alice");
    }

    #[tokio::test]
    async fn test_legacy_user_fields_are_read() {
        let (_dir, store) = store_with(
            Some(json!([{ "username": "alice", "password": "x", "firstName": "Alice", "imgUrl": "a.png" }])),
            None,
        )
        .await;

        let user = store.user_by_username("alice").await.unwrap();

        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.avatar_url.as_deref(), Some("a.png"));
    }
}
