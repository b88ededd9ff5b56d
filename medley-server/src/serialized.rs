//! All schemas that are exposed from endpoints are defined here
//! along with the From<T> impls

use serde::Serialize;
use utoipa::ToSchema;

use medley_core::{
    AddVideoOutcome, Collection as CoreCollection, Playlist as CorePlaylist, SourceTag,
    VideoEntry as CoreVideoEntry,
};
use medley_library::{
    SearchHit as CoreSearchHit, Session, UserData, VideoDetails as CoreVideoDetails,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    username: String,
    display_name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    video_id: String,
    title: String,
    thumbnail: String,
    duration: String,
    views: String,
    rating: f64,
    added_at: i64,
    is_local: bool,
    file_path: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    id: String,
    name: String,
    created_at: i64,
    video_count: usize,
    videos: Vec<VideoEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    username: String,
    /// Which storage location the collection lives in
    source: String,
    /// Id of the currently selected playlist
    active: Option<String>,
    playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    video_id: String,
    title: String,
    thumbnail: String,
    channel: String,
    published_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    duration: String,
    views: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoResult {
    /// One of `added`, `alreadyPresent`, or `unknownPlaylist`
    status: String,
    entry: Option<VideoEntry>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

impl ToSerialized<LoginResult> for Session {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<VideoEntry> for CoreVideoEntry {
    fn to_serialized(&self) -> VideoEntry {
        VideoEntry {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            thumbnail: self.display_thumbnail(),
            duration: self.duration.clone(),
            views: self.views.clone(),
            rating: self.rating,
            added_at: self.added_at,
            is_local: self.is_local,
            file_path: self.file_path.clone(),
        }
    }
}

impl ToSerialized<Playlist> for CorePlaylist {
    fn to_serialized(&self) -> Playlist {
        Playlist {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            video_count: self.videos.len(),
            videos: self.videos.to_serialized(),
        }
    }
}

impl ToSerialized<Collection> for CoreCollection {
    fn to_serialized(&self) -> Collection {
        let source = match self.source {
            SourceTag::PlaylistMap => "playlistMap",
            SourceTag::UserRegistry => "userRegistry",
        };

        Collection {
            username: self.username.clone(),
            source: source.to_string(),
            active: self.active.clone(),
            playlists: self.playlists.to_serialized(),
        }
    }
}

impl ToSerialized<SearchHit> for CoreSearchHit {
    fn to_serialized(&self) -> SearchHit {
        SearchHit {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            channel: self.channel.clone(),
            published_at: self.published_at.clone(),
        }
    }
}

impl ToSerialized<VideoDetails> for CoreVideoDetails {
    fn to_serialized(&self) -> VideoDetails {
        VideoDetails {
            duration: self.duration.clone(),
            views: self.views.clone(),
        }
    }
}

impl ToSerialized<AddVideoResult> for AddVideoOutcome {
    fn to_serialized(&self) -> AddVideoResult {
        match self {
            AddVideoOutcome::Added(entry) => AddVideoResult {
                status: "added".to_string(),
                entry: Some(entry.to_serialized()),
            },
            AddVideoOutcome::AlreadyPresent => AddVideoResult {
                status: "alreadyPresent".to_string(),
                entry: None,
            },
            AddVideoOutcome::UnknownPlaylist => AddVideoResult {
                status: "unknownPlaylist".to_string(),
                entry: None,
            },
        }
    }
}
