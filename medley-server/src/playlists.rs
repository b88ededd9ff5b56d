use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json,
};
use serde_json::Value;

use medley_core::{Confirmation, ViewConfig};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{DeleteQuery, NewPlaylistSchema, ValidatedJson, ViewQuery},
    serialized::{AddVideoResult, Collection, Playlist, ToSerialized, VideoEntry},
    uploads, Router,
};

#[utoipa::path(
    get,
    path = "/v1/playlists",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Collection)
    )
)]
async fn collection(session: Session, State(context): State<ServerContext>) -> Json<Collection> {
    let collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    Json(collection.to_serialized())
}

#[utoipa::path(
    post,
    path = "/v1/playlists",
    tag = "playlists",
    request_body = NewPlaylistSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Playlist),
        (status = 409, description = "A playlist with this name already exists")
    )
)]
async fn create_playlist(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewPlaylistSchema>,
) -> ServerResult<Json<Playlist>> {
    let mut collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    let playlist = context
        .library
        .playlists
        .create_playlist(&mut collection, &body.name)
        .await?;

    Ok(Json(playlist.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/playlists/{id}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Collection, description = "The collection after the delete, with the next selection")
    )
)]
async fn delete_playlist(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ServerResult<Json<Collection>> {
    let confirmation = if query.confirm {
        Confirmation::Confirmed
    } else {
        Confirmation::Cancelled
    };

    let mut collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    context
        .library
        .playlists
        .delete_playlist(&mut collection, &id, confirmation)
        .await?;

    Ok(Json(collection.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/playlists/{id}/videos",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<VideoEntry>, description = "The playlist's videos in display order")
    )
)]
async fn videos(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ServerResult<Json<Vec<VideoEntry>>> {
    let collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    let playlist = collection.playlist(&id).ok_or(ServerError::NotFound {
        resource: "playlist",
        identifier: "id",
    })?;

    let view = ViewConfig {
        filter: query.filter,
        sort: query.sort,
    };

    let videos = view
        .visible(playlist)
        .into_iter()
        .map(|video| video.to_serialized())
        .collect();

    Ok(Json(videos))
}

#[utoipa::path(
    post,
    path = "/v1/playlists/{id}/videos",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = AddVideoResult)
    )
)]
async fn add_video(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<String>,
    Json(record): Json<Value>,
) -> ServerResult<Json<AddVideoResult>> {
    let mut collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    let outcome = context
        .library
        .playlists
        .add_video(&mut collection, &id, &record)
        .await?;

    Ok(Json(outcome.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/playlists/{id}/videos/{video_id}",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Collection)
    )
)]
async fn remove_video(
    session: Session,
    State(context): State<ServerContext>,
    Path((id, video_id)): Path<(String, String)>,
) -> ServerResult<Json<Collection>> {
    let mut collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    context
        .library
        .playlists
        .remove_video(&mut collection, &id, &video_id)
        .await?;

    Ok(Json(collection.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(collection))
        .route("/", post(create_playlist))
        .route("/:id", delete(delete_playlist))
        .route("/:id/videos", get(videos))
        .route("/:id/videos", post(add_video))
        .route("/:id/videos/:video_id", delete(remove_video))
        .route("/:id/uploads", post(uploads::upload_to_playlist))
}
