use super::domain::{ImpactLevel, ReportCategory, ReportType};
use super::window::{DateRange, DepartmentFilter};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Current-versus-previous count with its percentage change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendCount {
    pub current: usize,
    pub previous: usize,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRate {
    pub current: f64,
    pub previous: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: ReportCategory,
    pub label: &'static str,
    pub incidents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCount {
    pub impact: ImpactLevel,
    pub label: &'static str,
    pub incidents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    pub hour: u32,
    pub incidents: usize,
}

/// Count for a free-form label such as a department or sub-detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub label: String,
    pub incidents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTypeCount {
    pub report_type: ReportType,
    pub label: &'static str,
    pub incidents: usize,
}

/// One category row of the category × impact cross-tabulation, cells in
/// severity order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTabRow {
    pub category: ReportCategory,
    pub label: &'static str,
    pub total: usize,
    pub by_severity: Vec<SeverityCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGranularity {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period_start: NaiveDate,
    pub incidents: usize,
    pub severe: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub granularity: TrendGranularity,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowView {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
    pub previous_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub department: DepartmentFilter,
}

/// Assembled analytics payload; every key is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDashboard {
    pub window: WindowView,
    pub totals: TrendCount,
    pub severe: TrendCount,
    pub recurrence: RecurrenceRate,
    pub trend: TrendSeries,
    pub by_category: Vec<CategoryCount>,
    pub by_severity: Vec<SeverityCount>,
    pub by_hour: Vec<HourCount>,
    pub cross_tab: Vec<CrossTabRow>,
    pub by_subcategory: Vec<LabelCount>,
    pub by_department: Vec<LabelCount>,
    pub by_report_type: Vec<ReportTypeCount>,
}
