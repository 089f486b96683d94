//! # Handlers
//!
//! Each privileged handler runs decode → authorize → validate → execute, in
//! that order, so a bad token never reaches validation or storage.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{DomainError, ImageName};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{decode_cutoff, Protobuf, QueryParams};
use crate::state::AppState;
use crate::wire;

const SUCCESS: &str = "success";

fn success() -> Protobuf<wire::StateResponse> {
    Protobuf(wire::StateResponse::new(SUCCESS))
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("Hello from kxpage backend v{}.", env!("CARGO_PKG_VERSION")),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Cutoff, see [`decode_cutoff`].
    pub q: Option<String>,
}

/// `GET /api/events?q=<cutoff>`
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Protobuf<wire::EventList>> {
    let before = query
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(decode_cutoff)
        .transpose()?;

    let events = state.events.list(before).await?;
    Ok(Protobuf(wire::EventList {
        events: events.iter().map(wire::Event::from).collect(),
    }))
}

/// `POST /api/events`
pub async fn create_events(
    State(state): State<AppState>,
    Protobuf(post): Protobuf<wire::EventPost>,
) -> ApiResult<Protobuf<wire::StateResponse>> {
    state.authorize(&post.token)?;

    let events = post
        .events
        .into_iter()
        .map(wire::Event::into_new_event)
        .collect::<Result<Vec<_>, _>>()?;
    state.events.create(events).await?;
    Ok(success())
}

/// `PUT /api/events`
pub async fn update_event(
    State(state): State<AppState>,
    Protobuf(update): Protobuf<wire::EventUpdate>,
) -> ApiResult<Protobuf<wire::StateResponse>> {
    state.authorize(&update.token)?;

    let event = update
        .event
        .ok_or_else(|| ApiError::BadRequest("update carries no event".into()))?;
    let (uuid, patch) = event.into_patch()?;
    state.events.update(&uuid, &patch).await?;
    Ok(success())
}

/// `DELETE /api/events`
pub async fn delete_events(
    State(state): State<AppState>,
    Protobuf(delete): Protobuf<wire::EventDelete>,
) -> ApiResult<Protobuf<wire::StateResponse>> {
    state.authorize(&delete.token)?;

    let uuids = delete
        .uuids
        .iter()
        .map(|raw| domains::EventId::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    state.events.delete(uuids).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub h: Option<String>,
}

/// `GET /api/images?h=<name>`: raw bytes, typed by extension.
pub async fn fetch_image(State(state): State<AppState>, QueryParams(query): QueryParams<ImageQuery>) -> ApiResult<Response> {
    let raw = query
        .h
        .ok_or_else(|| ApiError::BadRequest("missing image name".into()))?;
    let name = ImageName::parse(&raw)?;

    match state.images.fetch(&name).await {
        Ok((data, content_type)) => Ok(([(header::CONTENT_TYPE, content_type.to_string())], data).into_response()),
        Err(DomainError::NotFound(msg)) => Err(ApiError::NotFound(msg)),
        Err(e) => Err(ApiError::storage(e)),
    }
}

/// `POST /api/images`: replies with the stored name.
pub async fn upload_image(
    State(state): State<AppState>,
    Protobuf(upload): Protobuf<wire::ImageUpload>,
) -> ApiResult<Protobuf<wire::StateResponse>> {
    state.authorize(&upload.token)?;

    let name = ImageName::parse(&upload.filename)?;
    let stored = state
        .images
        .upload(name, upload.image)
        .await
        .map_err(ApiError::storage)?;
    Ok(Protobuf(wire::StateResponse::new(stored.to_string())))
}

/// `DELETE /api/images`
pub async fn delete_image(
    State(state): State<AppState>,
    Protobuf(delete): Protobuf<wire::ImageDelete>,
) -> ApiResult<Protobuf<wire::StateResponse>> {
    state.authorize(&delete.token)?;

    let name = ImageName::parse(&delete.filename)?;
    state.images.delete(&name).await.map_err(ApiError::storage)?;
    Ok(success())
}

/// `POST /api/images/info`
pub async fn storage_info(
    State(state): State<AppState>,
    Protobuf(admin): Protobuf<wire::AdminToken>,
) -> ApiResult<Protobuf<wire::StorageInfo>> {
    state.authorize(&admin.token)?;

    let info = state.images.info().await.map_err(ApiError::storage)?;
    Ok(Protobuf(info.into()))
}
