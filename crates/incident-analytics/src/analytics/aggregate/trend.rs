use super::super::domain::Report;
use super::super::views::{TrendGranularity, TrendPoint, TrendSeries};
use super::super::window::ReportWindow;
use chrono::{Datelike, Duration, Months, NaiveDate};

const DAILY_LIMIT_DAYS: i64 = 31;
const WEEKLY_LIMIT_DAYS: i64 = 180;

pub fn granularity_for(window: &ReportWindow) -> TrendGranularity {
    let days = window.duration().num_days();
    if days <= DAILY_LIMIT_DAYS {
        TrendGranularity::Day
    } else if days <= WEEKLY_LIMIT_DAYS {
        TrendGranularity::Week
    } else {
        TrendGranularity::Month
    }
}

/// Zero-filled incident and severe counts per bucket across `window`.
pub fn trend_series(reports: &[Report], window: &ReportWindow) -> TrendSeries {
    let granularity = granularity_for(window);
    let first_day = window.start.date_naive();
    let last_day = (window.end - Duration::nanoseconds(1)).date_naive();
    let origin = bucket_origin(first_day, granularity);

    let bucket_count = bucket_index(origin, last_day, granularity).map_or(0, |index| index + 1);
    let mut points: Vec<TrendPoint> = (0..bucket_count)
        .map(|index| TrendPoint {
            period_start: bucket_start(origin, index, granularity),
            incidents: 0,
            severe: 0,
        })
        .collect();

    for report in reports {
        let Some(index) = bucket_index(origin, report.occurred_at.date_naive(), granularity)
        else {
            continue;
        };
        if let Some(point) = points.get_mut(index) {
            point.incidents += 1;
            if report.impact.is_severe() {
                point.severe += 1;
            }
        }
    }

    TrendSeries {
        granularity,
        points,
    }
}

fn bucket_origin(first_day: NaiveDate, granularity: TrendGranularity) -> NaiveDate {
    match granularity {
        TrendGranularity::Day | TrendGranularity::Week => first_day,
        TrendGranularity::Month => first_day.with_day(1).unwrap_or(first_day),
    }
}

fn bucket_index(origin: NaiveDate, day: NaiveDate, granularity: TrendGranularity) -> Option<usize> {
    let offset = match granularity {
        TrendGranularity::Day => (day - origin).num_days(),
        TrendGranularity::Week => (day - origin).num_days().div_euclid(7),
        TrendGranularity::Month => {
            let months = |date: NaiveDate| i64::from(date.year()) * 12 + i64::from(date.month0());
            months(day) - months(origin)
        }
    };
    usize::try_from(offset).ok()
}

fn bucket_start(origin: NaiveDate, index: usize, granularity: TrendGranularity) -> NaiveDate {
    let index = index as i64;
    match granularity {
        TrendGranularity::Day => origin + Duration::days(index),
        TrendGranularity::Week => origin + Duration::weeks(index),
        TrendGranularity::Month => origin
            .checked_add_months(Months::new(index as u32))
            .unwrap_or(origin),
    }
}
