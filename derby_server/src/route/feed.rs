use askama::Template;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::route::{internal_error, AppState};

static CONTENT_TYPE_RSS: &str = "application/rss+xml";
static PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

static DESCRIPTION_NOT_DERBY: &str = "No.";
static DESCRIPTION_DERBY: &str =
    "YES, FRIENDS! YES! IT'S THE DERBY! IT'S THE GODDAMN KENTUCKY DERBY, GO AND TELL THE NEWS!";

/// The RSS 2.0 document with a single item for today.
///
/// Every field is generated by the server, so nothing is escaped.
#[derive(Debug, Template)]
#[template(path = "feed.xml", escape = "none")]
pub struct Feed<'a> {
    pub public_host: &'a str,
    pub description: &'a str,
    pub midnight_isoformat: String,
    pub midnight_pub_date: String,
}

/// Handle requests for the RSS feed.
pub async fn handler(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let now = (state.clock)();
    let midnight = state
        .calendar
        .midnight(now)
        .map_err(|err| internal_error(&state.settings, err))?;
    let description = if state.calendar.is_derby_today(now) {
        DESCRIPTION_DERBY
    } else {
        DESCRIPTION_NOT_DERBY
    };
    let feed = Feed {
        public_host: &state.settings.public_host,
        description,
        midnight_isoformat: midnight.to_rfc3339(),
        midnight_pub_date: midnight.format(PUB_DATE_FORMAT).to_string(),
    }
    .render()
    .map_err(|err| internal_error(&state.settings, err))?;
    Ok(([(CONTENT_TYPE, CONTENT_TYPE_RSS)], feed).into_response())
}
