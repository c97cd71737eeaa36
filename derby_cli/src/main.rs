use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use derby_core::derby_calendar::{DerbyCalendar, DerbySummary, DEFAULT_TIMEZONE};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(about = "Tell whether today is Kentucky Derby day")]
pub struct Arguments {
    /// ask about this date instead of today, as YYYY-MM-DD
    #[arg(long, conflicts_with = "year")]
    pub date: Option<NaiveDate>,
    /// print the Derby of this year instead
    #[arg(long)]
    pub year: Option<i32>,
    /// print JSON instead of text
    #[arg(long)]
    pub json: bool,
    /// the IANA timezone whose calendar decides Derby day
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,
}

fn run(args: &Arguments) -> Result<String> {
    let calendar = DerbyCalendar::new(&args.timezone)?;
    if let Some(year) = args.year {
        let occurrence = calendar.occurrence(calendar.calculate_derby_by_year(year)?);
        let date = occurrence.date.to_rfc3339();
        if args.json {
            let value = json!({
                "year": occurrence.year,
                "number": occurrence.number,
                "date": date,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }
        return Ok(format!("Derby #{}: {date}", occurrence.number));
    }
    let now = match args.date {
        Some(date) => calendar.start_of_day(date)?.with_timezone(&Utc),
        None => Utc::now(),
    };
    let summary = DerbySummary::from(&calendar.status(now)?);
    if args.json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    let answer = if summary.is_it_derby { "Yes." } else { "No." };
    Ok(format!(
        "{answer}\nNext Derby: #{} on {}, in {} days",
        summary.next_derby_number, summary.next_derby_date, summary.days_til_next_derby
    ))
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    println!("{}", run(&args)?);
    Ok(())
}
