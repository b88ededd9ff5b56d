use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    serialized::{AddVideoResult, ToSerialized},
};

/// The multipart field name the original clients upload under
const FILE_FIELD: &str = "mp3file";

#[utoipa::path(
    post,
    path = "/v1/playlists/{id}/uploads",
    tag = "playlists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = AddVideoResult, description = "The file was stored and added to the playlist as a local entry"),
        (status = 400, description = "No file was uploaded")
    )
)]
pub async fn upload_to_playlist(
    session: Session,
    State(context): State<ServerContext>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ServerResult<Json<AddVideoResult>> {
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Validation(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.mp3").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::Validation(e.to_string()))?;

        stored = Some(context.library.uploads.store(&original_name, &bytes).await?);
        break;
    }

    let stored = stored.ok_or_else(|| ServerError::Validation("No file uploaded".to_string()))?;

    let mut collection = context
        .library
        .playlists
        .collection(&session.user().username)
        .await;

    let outcome = context
        .library
        .playlists
        .add_video(&mut collection, &id, &stored.as_video_record())
        .await?;

    Ok(Json(outcome.to_serialized()))
}
