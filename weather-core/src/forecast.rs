//! Bucketing of 3-hour forecast samples into daily summaries.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::model::{ForecastDay, ForecastSample};

/// Maximum number of days emitted by [`aggregate_daily`].
pub const MAX_FORECAST_DAYS: usize = 5;

/// Index of the sample used for a day's icon and description.
/// Samples come in 3-hour steps starting near midnight, so index 3 is
/// roughly mid-day.
const REPRESENTATIVE_INDEX: usize = 3;

/// Group `samples` by calendar date in `tz` and summarize each day.
///
/// Dates keep the order in which they were first seen and at most
/// [`MAX_FORECAST_DAYS`] days are returned.
pub fn aggregate_daily<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<ForecastDay> {
    let mut groups: Vec<(NaiveDate, Vec<&ForecastSample>)> = Vec::new();

    for sample in samples {
        let Some(utc) = DateTime::from_timestamp(sample.timestamp, 0) else {
            tracing::warn!(timestamp = sample.timestamp, "skipping forecast sample with invalid timestamp");
            continue;
        };
        let date = utc.with_timezone(tz).date_naive();

        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, group)) => group.push(sample),
            None => groups.push((date, vec![sample])),
        }
    }

    groups
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, group)| summarize_day(date, &group))
        .collect()
}

fn summarize_day(date: NaiveDate, group: &[&ForecastSample]) -> ForecastDay {
    let (min, max) = group.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.temperature), hi.max(s.temperature))
    });

    // groups are never empty: a group is only created with its first sample
    let representative = group[REPRESENTATIVE_INDEX.min(group.len() - 1)];

    ForecastDay {
        day: date.format("%a").to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        temp_min: round_temperature(min),
        temp_max: round_temperature(max),
        icon: representative.icon.clone(),
        description: capitalize(&representative.description),
    }
}

/// Round to the nearest integer, ties to even.
pub fn round_temperature(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
