//! Resolution of dashboard query parameters into concrete report windows.
//!
//! Every aggregate in a response is computed through the same [`ReportFilter`]
//! so that histograms and cross-tabulations stay mutually consistent.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::domain::Report;
use super::error::AnalyticsError;

const DEFAULT_TRAILING_DAYS: i64 = 30;

/// Named relative ranges accepted by the `dateRange` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateRange {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "6m")]
    Last6Months,
    #[serde(rename = "1y")]
    LastYear,
}

impl DateRange {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last6Months => "6m",
            Self::LastYear => "1y",
        }
    }

    /// Start of the range when it ends at `end`.
    fn start_for(self, end: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self {
            Self::Last7Days => Some(end - Duration::days(7)),
            Self::Last30Days => Some(end - Duration::days(30)),
            Self::Last90Days => Some(end - Duration::days(90)),
            Self::Last6Months => end.checked_sub_months(Months::new(6)),
            Self::LastYear => end.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl FromStr for DateRange {
    type Err = AnalyticsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        match token.as_str() {
            "7d" | "last7days" | "week" => Ok(Self::Last7Days),
            "30d" | "last30days" | "month" => Ok(Self::Last30Days),
            "90d" | "last90days" | "quarter" => Ok(Self::Last90Days),
            "6m" | "last6months" => Ok(Self::Last6Months),
            "1y" | "lastyear" | "year" => Ok(Self::LastYear),
            _ => Err(AnalyticsError::InvalidInput(format!(
                "unknown dateRange '{raw}'"
            ))),
        }
    }
}

/// Half-open `[start, end)` interval a query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if start >= end {
            return Err(AnalyticsError::InvalidInput(format!(
                "window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn trailing(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Window of identical duration ending where this one starts.
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - self.duration(),
            end: self.start,
        }
    }
}

/// Department narrowing applied to every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(String),
}

impl DepartmentFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) if value.eq_ignore_ascii_case("all") => Self::All,
            Some(value) => Self::Only(value.to_string()),
        }
    }

    pub fn matches(&self, department: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => department.trim().eq_ignore_ascii_case(wanted),
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(department) => f.write_str(department),
        }
    }
}

impl Serialize for DepartmentFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The single predicate every aggregator applies: not deleted, in window,
/// department matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub window: ReportWindow,
    pub department: DepartmentFilter,
}

impl ReportFilter {
    pub fn admits(&self, report: &Report) -> bool {
        !report.deleted
            && self.window.contains(report.occurred_at)
            && self.department.matches(&report.department)
    }

    pub fn previous(&self) -> Self {
        Self {
            window: self.window.previous(),
            department: self.department.clone(),
        }
    }
}

/// Current and comparison filters for one dashboard request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsScope {
    pub current: ReportFilter,
    pub previous: ReportFilter,
    pub date_range: Option<DateRange>,
}

impl AnalyticsScope {
    pub fn new(current: ReportFilter, date_range: Option<DateRange>) -> Self {
        let previous = current.previous();
        Self {
            current,
            previous,
            date_range,
        }
    }
}

/// Raw query parameters as received over HTTP or the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl WindowQuery {
    /// Resolves the query relative to `now`.
    ///
    /// Explicit bounds win over `dateRange`; with neither, the window is the
    /// trailing 30 days.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<AnalyticsScope, AnalyticsError> {
        let department = DepartmentFilter::parse(self.department.as_deref());
        let start_date = non_blank(self.start_date.as_deref());
        let end_date = non_blank(self.end_date.as_deref());

        let (window, date_range) = match (start_date, end_date) {
            (Some(start), Some(end)) => {
                let start = parse_bound(start, Bound::Start)?;
                let end = parse_bound(end, Bound::End)?;
                (ReportWindow::new(start, end)?, None)
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AnalyticsError::InvalidInput(
                    "startDate and endDate must be supplied together".to_string(),
                ))
            }
            (None, None) => match non_blank(self.date_range.as_deref()) {
                Some(token) => {
                    let range: DateRange = token.parse()?;
                    (
                        ReportWindow {
                            start: range.start_for(now),
                            end: now,
                        },
                        Some(range),
                    )
                }
                None => (ReportWindow::trailing(now, DEFAULT_TRAILING_DAYS), None),
            },
        };

        Ok(AnalyticsScope::new(
            ReportFilter { window, department },
            date_range,
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Parses an explicit bound. Date-only end bounds are inclusive, so they
/// resolve to the following midnight.
fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, AnalyticsError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| {
        AnalyticsError::InvalidInput(format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
    })?;
    let date = match bound {
        Bound::Start => date,
        Bound::End => date.succ_opt().ok_or_else(|| {
            AnalyticsError::InvalidInput(format!("end date '{raw}' is out of range"))
        })?,
    };
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::{ImpactLevel, ReportCategory, ReportId, ReportType};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap()
    }

    fn query(range: Option<&str>, start: Option<&str>, end: Option<&str>) -> WindowQuery {
        WindowQuery {
            date_range: range.map(str::to_string),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            department: None,
        }
    }

    #[test]
    fn defaults_to_trailing_thirty_days() {
        let scope = WindowQuery::default().resolve(now()).expect("resolves");
        assert_eq!(scope.current.window.end, now());
        assert_eq!(scope.current.window.duration(), Duration::days(30));
        assert_eq!(scope.current.department, DepartmentFilter::All);
        assert!(scope.date_range.is_none());
    }

    #[test]
    fn named_range_sets_start_and_previous_window() {
        let scope = query(Some("7d"), None, None).resolve(now()).expect("resolves");
        assert_eq!(scope.date_range, Some(DateRange::Last7Days));
        assert_eq!(scope.current.window.start, now() - Duration::days(7));
        assert_eq!(scope.previous.window.end, scope.current.window.start);
        assert_eq!(
            scope.previous.window.duration(),
            scope.current.window.duration()
        );
    }

    #[test]
    fn explicit_bounds_take_precedence_and_end_is_inclusive() {
        let scope = query(Some("1y"), Some("2025-09-01"), Some("2025-09-30"))
            .resolve(now())
            .expect("resolves");
        assert!(scope.date_range.is_none());
        assert_eq!(
            scope.current.window.start,
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            scope.current.window.end,
            Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            scope.previous.window.start,
            Utc.with_ymd_and_hms(2025, 8, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn unparseable_dates_are_invalid_input() {
        let err = query(None, Some("09/01/2025"), Some("2025-09-30"))
            .resolve(now())
            .expect_err("bad date rejected");
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn single_bound_and_inverted_bounds_are_rejected() {
        assert!(query(None, Some("2025-09-01"), None).resolve(now()).is_err());
        assert!(query(None, Some("2025-09-30"), Some("2025-09-01"))
            .resolve(now())
            .is_err());
        assert!(query(Some("fortnight"), None, None).resolve(now()).is_err());
    }

    #[test]
    fn filter_excludes_deleted_out_of_window_and_other_departments() {
        let filter = ReportFilter {
            window: ReportWindow::trailing(now(), 7),
            department: DepartmentFilter::parse(Some(" Emergency ")),
        };
        let report = Report {
            id: ReportId("r-1".to_string()),
            report_type: ReportType::Incident,
            category: ReportCategory::Fall,
            impact: ImpactLevel::Minor,
            occurred_at: now() - Duration::days(1),
            department: "emergency".to_string(),
            location: "Bay 2".to_string(),
            subcategory: None,
            description: String::new(),
            deleted: false,
        };
        assert!(filter.admits(&report));

        let deleted = Report {
            deleted: true,
            ..report.clone()
        };
        assert!(!filter.admits(&deleted));

        let stale = Report {
            occurred_at: now() - Duration::days(8),
            ..report.clone()
        };
        assert!(!filter.admits(&stale));

        let elsewhere = Report {
            department: "Radiology".to_string(),
            ..report
        };
        assert!(!filter.admits(&elsewhere));
    }

    #[test]
    fn department_all_token_is_case_insensitive() {
        assert_eq!(DepartmentFilter::parse(Some("ALL")), DepartmentFilter::All);
        assert_eq!(DepartmentFilter::parse(Some("  ")), DepartmentFilter::All);
        assert!(DepartmentFilter::parse(None).matches("anything"));
    }
}
