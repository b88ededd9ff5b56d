use chrono::DateTime;
use serde_json::Value;

use crate::{
    util::{generate_playlist_id, now_millis},
    Playlist, VideoEntry,
};

// Alias precedence per field, accumulated across the historical client
// builds. The primary name comes first, the rest are probed in order.
const PLAYLIST_ID_KEYS: &[&str] = &["id", "playlistId"];
const VIDEO_ID_KEYS: &[&str] = &["videoId", "id", "youtubeId"];
const TITLE_KEYS: &[&str] = &["title", "videoTitle"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnail", "thumb", "image"];
const DURATION_KEYS: &[&str] = &["duration", "videoDuration"];
const VIEWS_KEYS: &[&str] = &["views", "viewCount"];
const ADDED_AT_KEYS: &[&str] = &["addedAt", "savedAt", "createdAt"];

const DEFAULT_PLAYLIST_NAME: &str = "Unnamed Playlist";

/// Canonicalizes a raw playlist record of unknown shape.
///
/// Every known alias is resolved, missing fields fall to their documented
/// defaults, and nested video records are canonicalized recursively. Never
/// fails, and normalizing an already canonical record yields an identical
/// one.
pub fn normalize_playlist(raw: &Value) -> Playlist {
    Playlist {
        id: text_field(raw, PLAYLIST_ID_KEYS).unwrap_or_else(generate_playlist_id),
        name: text_field(raw, &["name"]).unwrap_or_else(|| DEFAULT_PLAYLIST_NAME.to_string()),
        created_at: millis_field(raw, &["createdAt"]).unwrap_or_else(now_millis),
        videos: raw
            .get("videos")
            .and_then(Value::as_array)
            .map(|videos| videos.iter().map(normalize_video).collect())
            .unwrap_or_default(),
    }
}

/// Canonicalizes a raw video record of unknown shape. See [normalize_playlist].
pub fn normalize_video(raw: &Value) -> VideoEntry {
    let is_local = raw
        .get("isLocal")
        .and_then(Value::as_bool)
        .unwrap_or_default();

    VideoEntry {
        video_id: text_field(raw, VIDEO_ID_KEYS).unwrap_or_default(),
        title: text_field(raw, TITLE_KEYS).unwrap_or_default(),
        thumbnail: text_field(raw, THUMBNAIL_KEYS).unwrap_or_default(),
        duration: text_field(raw, DURATION_KEYS).unwrap_or_default(),
        views: text_field(raw, VIEWS_KEYS).unwrap_or_else(|| "0".to_string()),
        rating: raw.get("rating").and_then(as_number).unwrap_or_default(),
        added_at: millis_field(raw, ADDED_AT_KEYS).unwrap_or_else(now_millis),
        is_local,
        file_path: is_local
            .then(|| text_field(raw, &["filePath"]))
            .flatten(),
    }
}

/// Resolves the first alias holding usable text. Numbers are stringified,
/// since old records used numeric ids. Empty strings count as absent, the
/// same way the legacy clients treated them.
fn text_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Resolves the first alias holding a usable timestamp. Numbers are taken
/// as epoch milliseconds, strings are parsed as RFC 3339 (one client wrote
/// `createdAt` that way) or as a numeric string.
fn millis_field(raw: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match raw.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64)),
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.timestamp_millis())
            .ok()
            .or_else(|| text.parse().ok()),
        _ => None,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn canonical_video() -> Value {
        json!({
            "videoId": "v1",
            "title": "Song A",
            "thumbnail": "https://img.example/a.jpg",
            "duration": "3:51",
            "views": "1,204",
            "rating": 4.5,
            "addedAt": 1700000000000i64,
            "isLocal": false,
        })
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let first = normalize_video(&canonical_video());
        let second = normalize_video(&serde_json::to_value(&first).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_playlist_normalization_is_idempotent() {
        let raw = json!({
            "id": "pl_abc123",
            "name": "Road Trip",
            "createdAt": 1700000000000i64,
            "videos": [canonical_video()],
        });

        let first = normalize_playlist(&raw);
        let second = normalize_playlist(&serde_json::to_value(&first).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_aliases_normalize_identically() {
        let primary = json!({ "videoId": "v1", "thumbnail": "x", "addedAt": 5 });
        let aliased = json!({ "videoId": "v1", "thumb": "x", "savedAt": 5 });
        let older_alias = json!({ "youtubeId": "v1", "image": "x", "createdAt": 5 });

        assert_eq!(normalize_video(&primary), normalize_video(&aliased));
        assert_eq!(normalize_video(&primary), normalize_video(&older_alias));
    }

    #[test]
    fn test_alias_precedence_is_fixed() {
        let both = json!({ "thumbnail": "primary", "thumb": "fallback", "videoId": "v", "addedAt": 1 });

        assert_eq!(normalize_video(&both).thumbnail, "primary");
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let raw = json!({ "id": 1699999999999i64, "name": "Old", "createdAt": 1, "videos": [] });

        assert_eq!(normalize_playlist(&raw).id, "1699999999999");
    }

    #[test]
    fn test_iso_timestamps_are_parsed() {
        let raw = json!({ "videoId": "v1", "addedAt": "2023-11-14T22:13:20Z" });

        assert_eq!(normalize_video(&raw).added_at, 1700000000000);
    }

    #[test]
    fn test_malformed_input_yields_defaults() {
        let entry = normalize_video(&json!({ "rating": "not a number", "views": [1, 2] }));

        assert_eq!(entry.video_id, "");
        assert_eq!(entry.title, "");
        assert_eq!(entry.rating, 0.0);
        assert_eq!(entry.views, "0");
        assert!(!entry.is_local);
        assert_eq!(entry.file_path, None);

        let playlist = normalize_playlist(&json!({ "videos": "nope" }));

        assert!(playlist.id.starts_with("pl_"));
        assert_eq!(playlist.name, "Unnamed Playlist");
        assert!(playlist.videos.is_empty());
    }

    #[test]
    fn test_file_path_requires_local_flag() {
        let local = normalize_video(&json!({
            "videoId": "local_1",
            "isLocal": true,
            "filePath": "/uploads/a.mp3",
        }));
        let remote = normalize_video(&json!({
            "videoId": "v1",
            "filePath": "/uploads/a.mp3",
        }));

        assert_eq!(local.file_path.as_deref(), Some("/uploads/a.mp3"));
        assert_eq!(remote.file_path, None);
    }

    #[test]
    fn test_views_coercion() {
        assert_eq!(normalize_video(&json!({ "viewCount": 1204 })).views, "1204");
        assert_eq!(normalize_video(&json!({ "views": "1,204" })).views, "1,204");
        assert_eq!(normalize_video(&json!({})).views, "0");
    }
}
