use thiserror::Error;

mod youtube;
pub use youtube::*;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider must not be called with an empty query
    #[error("Search query is empty")]
    EmptyQuery,

    /// Text search needs an API key, pasting video links does not
    #[error("No search API key is configured")]
    MissingApiKey,

    #[error("Input is invalid: {0}")]
    Invalid(String),

    #[error("Failed to fetch resource: {0}")]
    FetchError(String),

    #[error("Failed to parse resource: {0}")]
    ParseError(String),
}

/// A single hit from the video platform
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel: String,
    pub published_at: String,
}

/// Extra display details fetched per video id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetails {
    /// Display string such as `4:05`
    pub duration: String,
    /// Display string such as `1,234,567`
    pub views: String,
}
