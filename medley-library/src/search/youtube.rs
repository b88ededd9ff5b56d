use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{SearchError, SearchHit, VideoDetails};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";
const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

const MAX_RESULTS: &str = "12";

lazy_static! {
    static ref URL_SCHEME_REGEX: Regex = Regex::new(r"^(https?://)?").expect("regex is valid");
    static ref ISO_DURATION_REGEX: Regex =
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("regex is valid");
}

/// Searches the video platform and resolves pasted video links.
pub struct VideoSearch {
    client: Client,
    api_key: Option<String>,
}

impl VideoSearch {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Returns true if the query is a link to the video platform rather
    /// than search text.
    pub fn is_video_url(query: &str) -> bool {
        let query = URL_SCHEME_REGEX.replace(query, "https://");

        match Url::parse(&query) {
            Ok(url) => url
                .host_str()
                .is_some_and(|host| host.ends_with("youtube.com") || host == "youtu.be"),
            Err(_) => false,
        }
    }

    /// Extracts the video id from a pasted link, if it has one.
    pub fn extract_video_id(query: &str) -> Option<String> {
        let query = URL_SCHEME_REGEX.replace(query, "https://");
        let url = Url::parse(&query).ok()?;

        if url.host_str() == Some("youtu.be") {
            return Some(url.path().trim_start_matches('/'))
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }

        for (key, value) in url.query_pairs() {
            if key == "v" && !value.is_empty() {
                return Some(value.into_owned());
            }
        }

        let segments: Vec<_> = url.path_segments()?.collect();

        segments
            .iter()
            .position(|segment| matches!(*segment, "embed" | "shorts" | "v"))
            .and_then(|index| segments.get(index + 1))
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
    }

    /// Searches for videos matching the query. A pasted video link
    /// resolves to a single hit without needing the API key.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        if Self::is_video_url(query) {
            return self.resolve_link(query).await.map(|hit| vec![hit]);
        }

        let key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let response: SearchResponse = self
            .get_json(
                SEARCH_ENDPOINT,
                &[
                    ("key", key),
                    ("part", "snippet"),
                    ("type", "video"),
                    ("maxResults", MAX_RESULTS),
                    ("q", query),
                ],
            )
            .await?;

        let hits = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let thumbnail = item
                    .snippet
                    .thumbnails
                    .medium
                    .or(item.snippet.thumbnails.standard)
                    .map(|thumbnail| thumbnail.url)
                    .unwrap_or_default();

                Some(SearchHit {
                    video_id,
                    title: item.snippet.title,
                    thumbnail,
                    channel: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect();

        Ok(hits)
    }

    /// Fetches duration and view counts for the given video ids, keyed by
    /// id. Gracefully returns nothing when no API key is configured, the
    /// app works without the extra details.
    pub async fn details(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, VideoDetails>, SearchError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(HashMap::new());
        };

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let response: DetailsResponse = self
            .get_json(
                VIDEOS_ENDPOINT,
                &[
                    ("key", key),
                    ("part", "contentDetails,statistics"),
                    ("id", &ids.join(",")),
                ],
            )
            .await?;

        let details = response
            .items
            .into_iter()
            .map(|item| {
                let details = VideoDetails {
                    duration: format_duration(&item.content_details.duration),
                    views: format_views(&item.statistics.view_count),
                };

                (item.id, details)
            })
            .collect();

        Ok(details)
    }

    /// Resolves a pasted link to a single hit, filling in title and
    /// thumbnail from oEmbed on a best-effort basis.
    async fn resolve_link(&self, query: &str) -> Result<SearchHit, SearchError> {
        let video_id = Self::extract_video_id(query)
            .ok_or_else(|| SearchError::Invalid("Not a recognized video link".to_string()))?;

        let mut hit = SearchHit {
            title: "YouTube Video".to_string(),
            thumbnail: format!("https://i.ytimg.com/vi/{video_id}/mqdefault.jpg"),
            channel: String::new(),
            published_at: String::new(),
            video_id,
        };

        let oembed: Result<OEmbedResponse, SearchError> = self
            .get_json(OEMBED_ENDPOINT, &[("url", query), ("format", "json")])
            .await;

        if let Ok(oembed) = oembed {
            hit.title = oembed.title;
            hit.channel = oembed.author_name;
            hit.thumbnail = oembed.thumbnail_url;
        }

        Ok(hit)
    }

    async fn get_json<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T, SearchError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.client
            .get(endpoint)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SearchError::FetchError(e.to_string()))?
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))
    }
}

/// Turns an ISO 8601 duration like `PT1H2M3S` into a display string
fn format_duration(iso: &str) -> String {
    let Some(captures) = ISO_DURATION_REGEX.captures(iso) else {
        return String::new();
    };

    let part = |index: usize| -> u32 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_default()
    };

    let (hours, minutes, seconds) = (part(1), part(2), part(3));

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats a raw view count with thousands separators
fn format_views(count: &str) -> String {
    let Ok(count) = count.parse::<u64>() else {
        return "0".to_string();
    };

    let digits = count.to_string();
    let mut formatted = String::new();

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }

        formatted.push(digit);
    }

    formatted
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    standard: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    items: Vec<DetailsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsItem {
    id: String,
    #[serde(default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    view_count: String,
}

#[derive(Debug, Default, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    thumbnail_url: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_url_testing() {
        assert!(VideoSearch::is_video_url(
            "https://www.youtube.com/watch?v=JwRWf3ho4B8&list=PL23A657E4BD523733&index=45"
        ));
        assert!(VideoSearch::is_video_url(
            "www.youtube.com/watch?v=z09GolEktUw&feature=youtu.be"
        ));
        assert!(VideoSearch::is_video_url(
            "https://music.youtube.com/watch?v=-t-75CCdM2o"
        ));
        assert!(VideoSearch::is_video_url("youtu.be/z09GolEktUw"));

        assert!(!VideoSearch::is_video_url("lofi hip hop radio"));
        assert!(!VideoSearch::is_video_url("https://example.com/watch?v=x"));
    }

    #[test]
    fn test_video_id_extraction() {
        let cases = [
            ("https://www.youtube.com/watch?v=z09GolEktUw", "z09GolEktUw"),
            ("youtu.be/z09GolEktUw", "z09GolEktUw"),
            ("https://www.youtube.com/embed/z09GolEktUw", "z09GolEktUw"),
            ("https://www.youtube.com/shorts/abc123", "abc123"),
            ("https://youtube.com/v/z09GolEktUw", "z09GolEktUw"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                VideoSearch::extract_video_id(input).as_deref(),
                Some(expected),
                "{input}"
            );
        }

        assert_eq!(VideoSearch::extract_video_id("https://www.youtube.com/"), None);
        assert_eq!(VideoSearch::extract_video_id("not a url at all"), None);
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT4M5S"), "4:05");
        assert_eq!(format_duration("PT30S"), "0:30");
        assert_eq!(format_duration("PT2H"), "2:00:00");
        assert_eq!(format_duration("garbage"), "");
        assert_eq!(format_duration(""), "");
    }

    #[test]
    fn test_view_formatting() {
        assert_eq!(format_views("1234567"), "1,234,567");
        assert_eq!(format_views("999"), "999");
        assert_eq!(format_views("1000"), "1,000");
        assert_eq!(format_views("not a number"), "0");
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let search = VideoSearch::new(None);

        assert!(matches!(
            search.search("   ").await,
            Err(SearchError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_text_search_without_key_is_rejected() {
        let search = VideoSearch::new(None);

        assert!(matches!(
            search.search("lofi beats").await,
            Err(SearchError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_details_without_key_is_empty() {
        let search = VideoSearch::new(None);
        let details = search.details(&["a".to_string()]).await.unwrap();

        assert!(details.is_empty());
    }
}
