use askama::Template;
use axum::{
    extract::State,
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use derby_core::derby_calendar::{DerbyStatus, DerbySummary};

use crate::{
    negotiate::wants_json,
    route::{internal_error, AppState},
};

#[derive(Debug, Template)]
#[template(path = "index.html")]
pub struct HomePage {
    pub is_it_derby: bool,
    pub next_derby_ordinal: String,
    pub next_derby_date: String,
    pub next_derby_day: String,
    pub days_til_next_derby: i64,
}

impl From<&DerbyStatus> for HomePage {
    fn from(value: &DerbyStatus) -> Self {
        let summary = DerbySummary::from(value);
        HomePage {
            is_it_derby: summary.is_it_derby,
            next_derby_ordinal: ordinal(summary.next_derby_number),
            next_derby_date: summary.next_derby_date,
            next_derby_day: value.next_derby.date.format("%A, %B %-d, %Y").to_string(),
            days_til_next_derby: summary.days_til_next_derby,
        }
    }
}

/// Format a running number as an English ordinal.
fn ordinal(number: i32) -> String {
    let suffix = match (number % 10, number % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}

/// Handle requests for the home page.
///
/// JSON is served to clients preferring it over HTML, everyone else gets the page.
pub async fn handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let status = state
        .calendar
        .status((state.clock)())
        .map_err(|err| internal_error(&state.settings, err))?;
    if wants_json(headers.get(ACCEPT)) {
        return Ok(Json(DerbySummary::from(&status)).into_response());
    }
    let page = HomePage::from(&status)
        .render()
        .map_err(|err| internal_error(&state.settings, err))?;
    Ok(Html(page).into_response())
}
