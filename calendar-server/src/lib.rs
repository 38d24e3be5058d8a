use std::sync::Arc;

use axum::{routing::get, Router};
use calendar_store::{Store, TimePolicy};
use tower_http::trace::TraceLayer;

pub mod cli;
mod error;
mod handlers;

pub use error::ApiError;

use handlers::{
    create_calendar, create_entry, delete_calendar, delete_entry, get_calendar, get_entry,
    list_calendars, list_entries, no_route, update_calendar, update_entry,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub times: TimePolicy,
}

impl AppState {
    pub fn new(store: Arc<Store>, times: TimePolicy) -> Self {
        Self { store, times }
    }
}

/// Collection routes answer both with and without the trailing slash.
pub fn router(state: AppState) -> Router {
    let calendars = get(list_calendars).post(create_calendar);
    let entries = get(list_entries).post(create_entry);

    Router::new()
        .route("/calendars", calendars.clone())
        .route("/calendars/", calendars)
        .route(
            "/calendars/:calendar_id",
            get(get_calendar)
                .put(update_calendar)
                .delete(delete_calendar),
        )
        .route("/calendars/:calendar_id/entries", entries.clone())
        .route("/calendars/:calendar_id/entries/", entries)
        .route(
            "/calendars/:calendar_id/entries/:entry_id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .fallback(no_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
