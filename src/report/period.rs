//! How a report splits its date range into smaller periods.

use time::{Date, Month};

/// The granularity of a report, chosen from the length of its date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    /// The range spans at most one month boundary. There is no breakdown.
    Month,
    /// The range spans at most twelve month boundaries. The breakdown is per month.
    Year,
    /// The range is longer than a year. The breakdown is per year.
    MultiYear,
}

/// One column of a period breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBucket {
    /// e.g. "Jan 2024" or "2024".
    pub label: String,
    /// The first day of the bucket, clamped to the report range.
    pub start: Date,
    /// The last day of the bucket, clamped to the report range.
    pub end: Date,
}

impl ReportPeriod {
    /// Classify the range `start` to `end` by the number of months between them.
    pub fn for_range(start: Date, end: Date) -> Self {
        let months = months_between(start, end);

        if months <= 1 {
            ReportPeriod::Month
        } else if months <= 12 {
            ReportPeriod::Year
        } else {
            ReportPeriod::MultiYear
        }
    }

    /// Split `start` to `end` into the buckets of this period, in date order.
    pub fn buckets(&self, start: Date, end: Date) -> Vec<PeriodBucket> {
        match self {
            ReportPeriod::Month => Vec::new(),
            ReportPeriod::Year => month_buckets(start, end),
            ReportPeriod::MultiYear => year_buckets(start, end),
        }
    }
}

fn months_between(start: Date, end: Date) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}

fn first_of_month(year: i32, month: Month) -> Option<Date> {
    Date::from_calendar_date(year, month, 1).ok()
}

fn month_buckets(start: Date, end: Date) -> Vec<PeriodBucket> {
    let mut buckets = Vec::new();
    let mut bucket_start = start;

    while bucket_start <= end {
        let next_month = match bucket_start.month() {
            Month::December => first_of_month(bucket_start.year() + 1, Month::January),
            month => first_of_month(bucket_start.year(), month.next()),
        };
        let bucket_end = next_month
            .and_then(Date::previous_day)
            .map_or(end, |last_day| last_day.min(end));

        buckets.push(PeriodBucket {
            label: format!("{} {}", short_month_name(bucket_start.month()), bucket_start.year()),
            start: bucket_start,
            end: bucket_end,
        });

        match next_month {
            Some(next_month) => bucket_start = next_month,
            None => break,
        }
    }

    buckets
}

fn year_buckets(start: Date, end: Date) -> Vec<PeriodBucket> {
    (start.year()..=end.year())
        .filter_map(|year| {
            let bucket_start = first_of_month(year, Month::January)?.max(start);
            let bucket_end = Date::from_calendar_date(year, Month::December, 31)
                .ok()?
                .min(end);

            Some(PeriodBucket {
                label: year.to_string(),
                start: bucket_start,
                end: bucket_end,
            })
        })
        .collect()
}

fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
