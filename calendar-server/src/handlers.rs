use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use calendar_store::{Calendar, CalendarInput, Entry, EntryInput};

use crate::{error::ApiError, AppState};

type Body<T> = Result<Json<T>, JsonRejection>;
type Reply<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

pub async fn list_calendars(State(state): State<AppState>) -> Json<BTreeMap<String, Calendar>> {
    Json(state.store.list_calendars().await)
}

pub async fn create_calendar(
    State(state): State<AppState>,
    body: Body<CalendarInput>,
) -> Created<Calendar> {
    let Json(input) = body?;
    let calendar = state.store.create_calendar(input.into_new()?).await;
    Ok((StatusCode::CREATED, Json(calendar)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Reply<Calendar> {
    Ok(Json(state.store.get_calendar(&calendar_id).await?))
}

pub async fn update_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Body<CalendarInput>,
) -> Reply<Calendar> {
    let Json(input) = body?;
    let calendar = state
        .store
        .update_calendar(&calendar_id, input.into_patch())
        .await?;
    Ok(Json(calendar))
}

pub async fn delete_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_calendar(&calendar_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_entries(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Reply<BTreeMap<String, Entry>> {
    Ok(Json(state.store.list_entries(&calendar_id).await?))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Body<EntryInput>,
) -> Created<Entry> {
    let Json(input) = body?;
    let entry = state
        .store
        .create_entry(&calendar_id, input.into_new(state.times)?)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path((calendar_id, entry_id)): Path<(String, String)>,
) -> Reply<Entry> {
    Ok(Json(state.store.get_entry(&calendar_id, &entry_id).await?))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path((calendar_id, entry_id)): Path<(String, String)>,
    body: Body<EntryInput>,
) -> Reply<Entry> {
    let Json(input) = body?;
    let entry = state
        .store
        .update_entry(&calendar_id, &entry_id, input.into_patch(state.times)?)
        .await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((calendar_id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_entry(&calendar_id, &entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn no_route() -> ApiError {
    ApiError::NoRoute
}
