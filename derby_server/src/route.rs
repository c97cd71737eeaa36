pub mod feed;
pub mod home;

use std::{fmt::Display, sync::Arc};

use axum::{http::StatusCode, routing::get, Router};
use chrono::{DateTime, Utc};
use derby_core::derby_calendar::DerbyCalendar;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::Settings;

/// The state shared by all handlers. Nothing in here changes after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub calendar: DerbyCalendar,
    pub settings: Arc<Settings>,
    pub clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(calendar: DerbyCalendar, settings: Settings) -> Self {
        AppState {
            calendar,
            settings: Arc::new(settings),
            clock: Utc::now,
        }
    }
}

/// Build the router; `/feed` is only routed when the feed is enabled.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new().route("/", get(home::handler));
    if state.settings.feed {
        router = router.route("/feed", get(feed::handler));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Log an error and turn it into a response, hiding the details unless debugging.
pub fn internal_error(settings: &Settings, err: impl Display) -> (StatusCode, String) {
    error!("{err}");
    let body = if settings.debug {
        err.to_string()
    } else {
        String::from("Internal Server Error")
    };
    (StatusCode::INTERNAL_SERVER_ERROR, body)
}
