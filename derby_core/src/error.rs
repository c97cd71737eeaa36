use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The timezone database has no entry for the configured identifier.
    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
    /// The local wall-clock time does not exist in the configured timezone.
    #[error("local time {0} does not exist in {1}")]
    NonexistentLocalTime(String, String),
}
