//! Pure reductions over an already-filtered report slice.

mod histograms;
mod recurrence;
mod trend;

pub use histograms::{
    category_histogram, cross_tabulation, department_histogram, hour_histogram,
    report_type_histogram, severity_histogram, subcategory_histogram, UNSPECIFIED_LABEL,
};
pub use recurrence::{recurrence_rate, recurring_count};
pub use trend::{granularity_for, trend_series};

use super::domain::Report;

pub fn total_count(reports: &[Report]) -> usize {
    reports.len()
}

/// Reports whose impact falls in the high-severity subset.
pub fn severe_count(reports: &[Report]) -> usize {
    reports
        .iter()
        .filter(|report| report.impact.is_severe())
        .count()
}

/// Change from `previous` to `current` in percent, rounded to one decimal.
///
/// A zero baseline reports 100 when anything happened and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round_one_decimal((current - previous) / previous * 100.0)
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
