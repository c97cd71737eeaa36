//! This crate implements a web server answering whether today is Kentucky Derby day.
//!
//! `/` serves an HTML page or, to clients preferring it, a JSON document. `/feed` serves an RSS
//! feed with a single item for today.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use derby_core::derby_calendar::DerbyCalendar;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Arguments, Settings},
    route::AppState,
};

mod config;
mod negotiate;
mod route;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    init_tracing(args.debug);
    // every request depends on the timezone, so a broken one must stop the server here
    let calendar = DerbyCalendar::new(&args.timezone)?;
    let status = calendar.status(Utc::now())?;
    info!(
        timezone = %calendar.timezone(),
        next_derby = %status.next_derby.date.to_rfc3339(),
        "calendar ready"
    );
    let addr = args.socket_addr();
    let app = route::router(AppState::new(calendar, Settings::from(&args)));
    info!("listening on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
