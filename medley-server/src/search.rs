use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{DetailsQuery, SearchQuery},
    serialized::{SearchHit, ToSerialized, VideoDetails},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/search",
    tag = "search",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<SearchHit>),
        (status = 400, description = "The query is empty, or no API key is configured for text search")
    )
)]
async fn search(
    _session: Session,
    State(context): State<ServerContext>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<Vec<SearchHit>>> {
    let hits = context.library.search.search(&query.q).await?;

    Ok(Json(hits.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/search/details",
    tag = "search",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Duration and view count display strings, keyed by video id")
    )
)]
async fn details(
    _session: Session,
    State(context): State<ServerContext>,
    Query(query): Query<DetailsQuery>,
) -> ServerResult<Json<HashMap<String, VideoDetails>>> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let details = context.library.search.details(&ids).await?;

    Ok(Json(
        details
            .into_iter()
            .map(|(id, details)| (id, details.to_serialized()))
            .collect(),
    ))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(search))
        .route("/details", get(details))
}
