// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Calendar-aligned point totals (daily, weekly, monthly)
//!
//! Events are bucketed on the user's local calendar date, so an event late on
//! Sunday evening stays in that week even when it is already Monday in UTC.
//! Series are sparse: periods without events produce no bucket.

use crate::models::PointEvent;
use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Calendar period used for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized timeframe name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown timeframe: {0}. Expected daily, weekly or monthly")]
pub struct UnknownTimeframe(pub String);

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(UnknownTimeframe(other.to_string())),
        }
    }
}

/// Point total for one calendar period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    pub period_start: NaiveDate,
    pub label: String,
    pub total: i64,
}

/// First day of the period containing `date`
///
/// Weeks start on Monday; a Sunday belongs to the week that began six days earlier.
pub fn period_anchor(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Daily => date,
        Timeframe::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        Timeframe::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
    }
}

/// Display label for the period starting at `anchor`
pub fn period_label(anchor: NaiveDate, timeframe: Timeframe) -> String {
    match timeframe {
        Timeframe::Daily => anchor.format("%b %-d").to_string(),
        Timeframe::Weekly => {
            let end = anchor + Duration::days(6);
            format!("{} - {}", anchor.format("%b %-d"), end.format("%b %-d"))
        }
        Timeframe::Monthly => anchor.format("%b %Y").to_string(),
    }
}

/// Sum point events per period on the local calendar
pub fn aggregate(events: &[PointEvent], timeframe: Timeframe) -> Vec<PeriodBucket> {
    aggregate_in(events, timeframe, &Local)
}

/// Sum point events per period on the calendar of `tz`, ascending by period start
pub fn aggregate_in<Tz: TimeZone>(
    events: &[PointEvent],
    timeframe: Timeframe,
    tz: &Tz,
) -> Vec<PeriodBucket> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for event in events {
        let local_date = event.occurred_at.with_timezone(tz).date_naive();
        let total = totals.entry(period_anchor(local_date, timeframe)).or_insert(0);
        *total = total.saturating_add(event.amount);
    }

    totals
        .into_iter()
        .map(|(period_start, total)| PeriodBucket {
            period_start,
            label: period_label(period_start, timeframe),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn at(timestamp: &str, amount: i64) -> PointEvent {
        let occurred_at = DateTime::parse_from_rfc3339(timestamp)
            .unwrap()
            .with_timezone(&Utc);
        PointEvent::new(amount, occurred_at)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        assert!(aggregate(&[], Timeframe::Daily).is_empty());
        assert!(aggregate_in(&[], Timeframe::Monthly, &Utc).is_empty());
    }

    #[test]
    fn test_same_day_events_are_summed() {
        let events = vec![
            at("2026-10-14T08:00:00Z", 20),
            at("2026-10-14T21:30:00Z", 35),
        ];

        let buckets = aggregate_in(&events, Timeframe::Daily, &Utc);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period_start, date(2026, 10, 14));
        assert_eq!(buckets[0].total, 55);
        assert_eq!(buckets[0].label, "Oct 14");
    }

    #[test]
    fn test_weekly_anchor_is_monday() {
        // 2026-10-12 is a Monday, 2026-10-18 a Sunday
        assert_eq!(period_anchor(date(2026, 10, 12), Timeframe::Weekly), date(2026, 10, 12));
        assert_eq!(period_anchor(date(2026, 10, 15), Timeframe::Weekly), date(2026, 10, 12));
        assert_eq!(period_anchor(date(2026, 10, 18), Timeframe::Weekly), date(2026, 10, 12));
        assert_eq!(period_anchor(date(2026, 10, 19), Timeframe::Weekly), date(2026, 10, 19));
    }

    #[test]
    fn test_weekly_buckets_across_boundary() {
        let events = vec![
            at("2026-10-19T09:00:00Z", 10),
            at("2026-10-18T09:00:00Z", 25),
            at("2026-10-13T09:00:00Z", 30),
        ];

        let buckets = aggregate_in(&events, Timeframe::Weekly, &Utc);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period_start, date(2026, 10, 12));
        assert_eq!(buckets[0].total, 55);
        assert_eq!(buckets[0].label, "Oct 12 - Oct 18");
        assert_eq!(buckets[1].period_start, date(2026, 10, 19));
        assert_eq!(buckets[1].total, 10);
    }

    #[test]
    fn test_local_calendar_not_utc() {
        // 02:00 UTC on Monday is still Sunday evening at UTC-5
        let events = vec![at("2026-10-19T02:00:00Z", 40)];
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();

        let local = aggregate_in(&events, Timeframe::Weekly, &eastern);
        let utc = aggregate_in(&events, Timeframe::Weekly, &Utc);

        assert_eq!(local[0].period_start, date(2026, 10, 12));
        assert_eq!(utc[0].period_start, date(2026, 10, 19));
    }

    #[test]
    fn test_monthly_buckets_sorted_and_sparse() {
        let events = vec![
            at("2026-12-03T12:00:00Z", 15),
            at("2026-09-30T12:00:00Z", 20),
            at("2026-09-01T12:00:00Z", 5),
        ];

        let buckets = aggregate_in(&events, Timeframe::Monthly, &Utc);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period_start, date(2026, 9, 1));
        assert_eq!(buckets[0].total, 25);
        assert_eq!(buckets[0].label, "Sep 2026");
        assert_eq!(buckets[1].period_start, date(2026, 12, 1));
        assert_eq!(buckets[1].label, "Dec 2026");
    }

    #[test]
    fn test_timeframe_parsing() {
        assert_eq!("weekly".parse::<Timeframe>().unwrap(), Timeframe::Weekly);
        assert_eq!(" Daily ".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert!("yearly".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::Monthly.to_string(), "monthly");
    }
}
