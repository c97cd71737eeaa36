//! Derby day arithmetic on the civil calendar.
//!
//! The week-of-month rule in [`is_derby`] and the day pinning in [`derby_day`] reproduce the
//! historical formulas of the site, including their quirks for months starting on a Sunday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{Error, Result};

pub static DEFAULT_TIMEZONE: &str = "US/Eastern";
/// The running number of a Derby is counted from this year.
pub const FIRST_DERBY_YEAR: i32 = 1874;

const DERBY_MONTH: u32 = 5;
/// Saturday, counted from Monday.
const DERBY_WEEKDAY: u32 = 5;
const POST_TIME: (u32, u32) = (18, 30);

/// Check whether the date is Derby day.
///
/// The date must match May, the first week of the month and a Saturday.
pub fn is_derby<D: Datelike>(date: &D) -> bool {
    date.month() == DERBY_MONTH
        && week_of_month(date) == 1
        && date.weekday().num_days_from_monday() == DERBY_WEEKDAY
}

/// Get the week of the month, counting weeks from Monday.
///
/// When the month starts on a Sunday the day is ignored and every date falls into the first week.
fn week_of_month<D: Datelike>(date: &D) -> u32 {
    let weekday = date.weekday().num_days_from_monday();
    let first_weekday = (weekday + 7 - date.day0() % 7) % 7;
    let adjusted_day_of_month = if first_weekday == 6 {
        f64::from(1 + first_weekday) / 7.0
    } else {
        f64::from(date.day() + first_weekday)
    };
    (adjusted_day_of_month / 7.0).ceil() as u32
}

/// Get the civil date of the Derby in the given year.
///
/// Changing this function moves published Derby dates!
pub fn derby_day(year: i32) -> Result<NaiveDate> {
    let first_day_of_may =
        NaiveDate::from_ymd_opt(year, DERBY_MONTH, 1).ok_or(Error::YearOutOfRange(year))?;
    let mut day = 6 - first_day_of_may.weekday().num_days_from_monday();
    // a Sunday on May 1 yields zero and is pinned to the 1st
    if day == 0 {
        day = 1;
    }
    first_day_of_may
        .with_day(day)
        .ok_or(Error::YearOutOfRange(year))
}

/// One running of the Derby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerbyOccurrence {
    pub year: i32,
    pub date: DateTime<Tz>,
    pub number: i32,
}

/// Everything the pages show, derived from a single point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerbyStatus {
    pub is_it_derby: bool,
    pub midnight: DateTime<Tz>,
    pub next_derby: DerbyOccurrence,
    pub days_til_next_derby: i64,
}

/// The serializable view of a [`DerbyStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerbySummary {
    pub is_it_derby: bool,
    pub next_derby_number: i32,
    pub next_derby_date: String,
    pub days_til_next_derby: i64,
}

impl From<&DerbyStatus> for DerbySummary {
    fn from(value: &DerbyStatus) -> Self {
        DerbySummary {
            is_it_derby: value.is_it_derby,
            next_derby_number: value.next_derby.number,
            next_derby_date: value.next_derby.date.to_rfc3339(),
            days_til_next_derby: value.days_til_next_derby,
        }
    }
}

/// The immutable configuration every computation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerbyCalendar {
    timezone: Tz,
    first_derby_year: i32,
}

impl Default for DerbyCalendar {
    fn default() -> Self {
        DerbyCalendar {
            timezone: chrono_tz::US::Eastern,
            first_derby_year: FIRST_DERBY_YEAR,
        }
    }
}

impl DerbyCalendar {
    /// Build a calendar for a timezone identifier of the IANA database.
    pub fn new(timezone: &str) -> Result<Self> {
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|_| Error::UnknownTimezone(timezone.to_string()))?;
        Ok(DerbyCalendar {
            timezone,
            ..DerbyCalendar::default()
        })
    }

    pub fn with_first_derby_year(self, first_derby_year: i32) -> Self {
        DerbyCalendar {
            first_derby_year,
            ..self
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn first_derby_year(&self) -> i32 {
        self.first_derby_year
    }

    pub fn localize(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.timezone)
    }

    fn local(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| Error::NonexistentLocalTime(naive.to_string(), self.timezone.to_string()))
    }

    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Tz>> {
        self.local(date.and_time(NaiveTime::MIN))
    }

    /// Get the start of the local day containing `now`.
    pub fn midnight(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        self.start_of_day(self.localize(now).date_naive())
    }

    pub fn is_derby_today(&self, now: DateTime<Utc>) -> bool {
        is_derby(&self.localize(now))
    }

    /// Get the post time of the Derby in the given year.
    pub fn calculate_derby_by_year(&self, year: i32) -> Result<DateTime<Tz>> {
        let (hour, minute) = POST_TIME;
        let naive = derby_day(year)?
            .and_hms_opt(hour, minute, 0)
            .ok_or(Error::YearOutOfRange(year))?;
        self.local(naive)
    }

    /// Get the next Derby as seen from `now`.
    ///
    /// This year's Derby counts only while it is at least a day after today's midnight, so on
    /// Derby day itself the next one is already a year away.
    pub fn next_derby(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let midnight = self.midnight(now)?;
        let derby = self.calculate_derby_by_year(midnight.year())?;
        if derby < midnight + Duration::days(1) {
            return self.calculate_derby_by_year(midnight.year() + 1);
        }
        Ok(derby)
    }

    pub fn occurrence(&self, date: DateTime<Tz>) -> DerbyOccurrence {
        DerbyOccurrence {
            year: date.year(),
            date,
            number: date.year() - self.first_derby_year,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> Result<DerbyStatus> {
        let midnight = self.midnight(now)?;
        let next_derby = self.occurrence(self.next_derby(now)?);
        Ok(DerbyStatus {
            is_it_derby: self.is_derby_today(now),
            midnight,
            next_derby,
            days_til_next_derby: next_derby.date.signed_duration_since(midnight).num_days(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeZone, Timelike, Utc};
    use chrono_tz::US::Eastern;

    use crate::{
        derby_calendar::{derby_day, is_derby, DerbyCalendar, DerbySummary},
        Error,
    };

    fn eastern(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Eastern
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_is_derby() {
        assert!(is_derby(&NaiveDate::from_str("2023-05-06").unwrap()));
        assert!(!is_derby(&NaiveDate::from_str("2023-04-29").unwrap()));
        assert!(!is_derby(&NaiveDate::from_str("2023-05-13").unwrap()));
        assert!(!is_derby(&NaiveDate::from_str("2023-05-07").unwrap()));
        // first week and a Saturday, but not May
        assert!(!is_derby(&NaiveDate::from_str("2023-04-01").unwrap()));
        assert!(is_derby(&NaiveDate::from_str("2021-05-01").unwrap()));
        assert!(!is_derby(&NaiveDate::from_str("2021-05-08").unwrap()));
    }

    /// May 2022 starts on a Sunday, so every Saturday of that month is matched.
    #[test]
    fn test_is_derby_month_starting_on_sunday() {
        for day in [7, 14, 21, 28] {
            let date = NaiveDate::from_ymd_opt(2022, 5, day).unwrap();
            assert!(is_derby(&date), "{date}");
        }
        assert!(!is_derby(&NaiveDate::from_str("2022-05-15").unwrap()));
        assert!(!is_derby(&NaiveDate::from_str("2022-05-01").unwrap()));
    }

    #[test]
    fn test_is_derby_with_local_time() {
        let calendar = DerbyCalendar::default();
        assert!(calendar.is_derby_today(eastern(2023, 5, 6, 0, 5)));
        assert!(calendar.is_derby_today(eastern(2023, 5, 6, 23, 55)));
        // still Friday evening in Louisville, already Saturday in UTC
        assert!(!calendar.is_derby_today(eastern(2023, 5, 5, 22, 0)));
    }

    #[test]
    fn test_derby_day() {
        assert_eq!(derby_day(2023).unwrap(), NaiveDate::from_str("2023-05-06").unwrap());
        assert_eq!(derby_day(2024).unwrap(), NaiveDate::from_str("2024-05-04").unwrap());
        assert_eq!(derby_day(2026).unwrap(), NaiveDate::from_str("2026-05-02").unwrap());
        assert_eq!(derby_day(2028).unwrap(), NaiveDate::from_str("2028-05-06").unwrap());
        // May 1 on a Saturday
        assert_eq!(derby_day(2021).unwrap(), NaiveDate::from_str("2021-05-01").unwrap());
        assert_eq!(derby_day(2027).unwrap(), NaiveDate::from_str("2027-05-01").unwrap());
        // May 1 on a Sunday is pinned to the 1st
        assert_eq!(derby_day(2022).unwrap(), NaiveDate::from_str("2022-05-01").unwrap());
        assert_eq!(derby_day(i32::MAX), Err(Error::YearOutOfRange(i32::MAX)));
    }

    #[test]
    fn test_calculate_derby_by_year() {
        let calendar = DerbyCalendar::default();
        for year in 2015..=2035 {
            let derby = calendar.calculate_derby_by_year(year).unwrap();
            assert_eq!(derby.year(), year);
            assert_eq!(derby.month(), 5);
            assert_eq!(derby.hour(), 18);
            assert_eq!(derby.minute(), 30);
            assert_eq!(derby.offset().fix().local_minus_utc(), -4 * 3600);
        }
        let derby = calendar.calculate_derby_by_year(2021).unwrap();
        assert_eq!(derby.day(), 1);
        assert_eq!(derby.to_rfc3339(), "2021-05-01T18:30:00-04:00");
    }

    #[test]
    fn test_next_derby() {
        let calendar = DerbyCalendar::default();
        let this_year = calendar.calculate_derby_by_year(2023).unwrap();
        let next_year = calendar.calculate_derby_by_year(2024).unwrap();
        assert_eq!(calendar.next_derby(eastern(2023, 1, 1, 0, 0)).unwrap(), this_year);
        assert_eq!(calendar.next_derby(eastern(2023, 5, 5, 23, 59)).unwrap(), this_year);
        // the Derby is less than a day after midnight on Derby day
        assert_eq!(calendar.next_derby(eastern(2023, 5, 6, 8, 0)).unwrap(), next_year);
        assert_eq!(calendar.next_derby(eastern(2023, 5, 7, 12, 0)).unwrap(), next_year);
        assert_eq!(calendar.next_derby(eastern(2023, 12, 31, 23, 59)).unwrap(), next_year);
    }

    #[test]
    fn test_midnight() {
        let calendar = DerbyCalendar::default();
        let midnight = calendar.midnight(eastern(2023, 5, 5, 21, 15)).unwrap();
        assert_eq!(midnight.to_rfc3339(), "2023-05-05T00:00:00-04:00");
        // daylight saving time starts later that day
        let midnight = calendar.midnight(eastern(2023, 3, 12, 15, 0)).unwrap();
        assert_eq!(midnight.to_rfc3339(), "2023-03-12T00:00:00-05:00");
    }

    #[test]
    fn test_status() {
        let calendar = DerbyCalendar::default();
        let status = calendar.status(eastern(2023, 5, 5, 12, 0)).unwrap();
        assert!(!status.is_it_derby);
        assert_eq!(status.next_derby.year, 2023);
        assert_eq!(status.next_derby.number, 149);
        assert_eq!(status.days_til_next_derby, 1);

        let status = calendar.status(eastern(2023, 5, 6, 9, 0)).unwrap();
        assert!(status.is_it_derby);
        assert_eq!(status.next_derby.year, 2024);
        assert_eq!(status.next_derby.number, 150);
        assert_eq!(status.days_til_next_derby, 364);
    }

    #[test]
    fn test_days_til_next_derby_is_never_negative() {
        let calendar = DerbyCalendar::default();
        let mut date = NaiveDate::from_str("2022-12-25").unwrap();
        while date.year() < 2025 {
            let now = eastern(date.year(), date.month(), date.day(), 12, 0);
            let status = calendar.status(now).unwrap();
            let expected = status
                .next_derby
                .date
                .signed_duration_since(status.midnight)
                .num_days();
            assert_eq!(status.days_til_next_derby, expected);
            assert!(status.days_til_next_derby >= 1, "{date}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_summary() {
        let calendar = DerbyCalendar::default();
        let status = calendar.status(eastern(2023, 5, 1, 12, 0)).unwrap();
        let summary = DerbySummary::from(&status);
        assert_eq!(
            summary,
            DerbySummary {
                is_it_derby: false,
                next_derby_number: 149,
                next_derby_date: String::from("2023-05-06T18:30:00-04:00"),
                days_til_next_derby: 5,
            }
        );
    }

    #[test]
    fn test_new() {
        assert_eq!(DerbyCalendar::new("US/Eastern").unwrap(), DerbyCalendar::default());
        assert_eq!(
            DerbyCalendar::new("Mars/Olympus_Mons"),
            Err(Error::UnknownTimezone(String::from("Mars/Olympus_Mons")))
        );
        let calendar = DerbyCalendar::new("America/Kentucky/Louisville")
            .unwrap()
            .with_first_derby_year(1875);
        assert_eq!(calendar.occurrence(calendar.calculate_derby_by_year(2023).unwrap()).number, 148);
    }
}
