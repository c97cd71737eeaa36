//! This crate answers whether today is Kentucky Derby day and when the next Derby runs.
//!
//! All dates are computed on the civil calendar of a configured timezone, `US/Eastern` by default.

pub use chrono;
pub use chrono_tz;

pub mod derby_calendar;
pub mod error;

pub use error::{Error, Result};
