use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Playlist, VideoEntry};

/// How a playlist's videos are ordered for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Lexicographic by title
    #[default]
    Az,
    /// Most recently added first
    Newest,
    Oldest,
    /// Highest rating first, stored order breaks ties
    Rating,
}

/// Display configuration for one render of a playlist. Each user action
/// produces a new value, nothing here is shared or ambient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewConfig {
    /// Case-insensitive substring match against titles, empty selects all
    pub filter: String,
    pub sort: SortMode,
}

impl ViewConfig {
    /// Computes the display-ordered sequence of entries for this view.
    /// The playlist's stored order is never touched, so clearing a filter
    /// or switching the sort mode back restores the previous view exactly.
    pub fn visible<'a>(&self, playlist: &'a Playlist) -> Vec<&'a VideoEntry> {
        let needle = self.filter.trim().to_lowercase();

        let mut videos: Vec<&VideoEntry> = playlist
            .videos
            .iter()
            .filter(|video| needle.is_empty() || video.title.to_lowercase().contains(&needle))
            .collect();

        // Vec::sort_by is stable, which the rating mode relies on
        match self.sort {
            SortMode::Az => videos.sort_by_key(|video| video.title.to_lowercase()),
            SortMode::Newest => videos.sort_by_key(|video| std::cmp::Reverse(video.added_at)),
            SortMode::Oldest => videos.sort_by_key(|video| video.added_at),
            SortMode::Rating => videos.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
        }

        videos
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(video_id: &str, title: &str, added_at: i64, rating: f64) -> VideoEntry {
        VideoEntry {
            video_id: video_id.to_string(),
            title: title.to_string(),
            thumbnail: String::new(),
            duration: String::new(),
            views: "0".to_string(),
            rating,
            added_at,
            is_local: false,
            file_path: None,
        }
    }

    fn playlist() -> Playlist {
        Playlist {
            id: "pl_test".to_string(),
            name: "Test".to_string(),
            created_at: 0,
            videos: vec![
                entry("b", "Bravo", 2, 3.0),
                entry("a", "Alpha", 3, 5.0),
                entry("c", "Charlie", 1, 3.0),
            ],
        }
    }

    fn ids(videos: &[&VideoEntry]) -> Vec<String> {
        videos.iter().map(|v| v.video_id.clone()).collect()
    }

    #[test]
    fn test_sort_modes() {
        let playlist = playlist();

        let az = ViewConfig::default();
        assert_eq!(ids(&az.visible(&playlist)), ["a", "b", "c"]);

        let newest = ViewConfig { sort: SortMode::Newest, ..Default::default() };
        assert_eq!(ids(&newest.visible(&playlist)), ["a", "b", "c"]);

        let oldest = ViewConfig { sort: SortMode::Oldest, ..Default::default() };
        assert_eq!(ids(&oldest.visible(&playlist)), ["c", "b", "a"]);
    }

    #[test]
    fn test_rating_sort_keeps_stored_order_on_ties() {
        let view = ViewConfig { sort: SortMode::Rating, ..Default::default() };

        // "b" and "c" are tied, so they keep their stored relative order
        assert_eq!(ids(&view.visible(&playlist())), ["a", "b", "c"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let view = ViewConfig { filter: "RaV".to_string(), ..Default::default() };

        assert_eq!(ids(&view.visible(&playlist())), ["b"]);
    }

    #[test]
    fn test_filter_round_trip_restores_order() {
        let playlist = playlist();
        let sorted = ViewConfig::default();
        let filtered = ViewConfig { filter: "b".to_string(), ..Default::default() };

        assert_eq!(ids(&sorted.visible(&playlist)), ["a", "b", "c"]);
        assert_eq!(ids(&filtered.visible(&playlist)), ["b"]);
        // Clearing the filter restores the sorted view, and the stored
        // order was never touched to begin with
        assert_eq!(ids(&sorted.visible(&playlist)), ["a", "b", "c"]);

        let stored: Vec<_> = playlist.videos.iter().map(|v| v.video_id.clone()).collect();
        assert_eq!(stored, ["b", "a", "c"]);
    }

    #[test]
    fn test_sort_mode_wire_names() {
        for (mode, name) in [
            (SortMode::Az, "\"az\""),
            (SortMode::Newest, "\"newest\""),
            (SortMode::Oldest, "\"oldest\""),
            (SortMode::Rating, "\"rating\""),
        ] {
            assert_eq!(serde_json::to_string(&mode).unwrap(), name);
        }
    }
}
