use super::super::domain::{Report, ReportCategory};
use super::round_one_decimal;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Reports preceded by an earlier report with the same category and location.
///
/// Grouping by (category, location) keeps this linear: within a group every
/// report later than the group's earliest timestamp is recurring, which is
/// exactly the pairwise "some other report is strictly earlier" rule.
pub fn recurring_count(reports: &[Report]) -> usize {
    let mut groups: HashMap<(ReportCategory, String), Vec<DateTime<Utc>>> = HashMap::new();
    for report in reports {
        groups
            .entry((report.category, location_key(&report.location)))
            .or_default()
            .push(report.occurred_at);
    }

    groups
        .values()
        .map(|timestamps| {
            let earliest = timestamps.iter().min().copied();
            timestamps
                .iter()
                .filter(|timestamp| Some(**timestamp) > earliest)
                .count()
        })
        .sum()
}

/// Share of recurring reports in percent, in `[0, 100]`; 0 for an empty set.
pub fn recurrence_rate(reports: &[Report]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let recurring = recurring_count(reports) as f64;
    round_one_decimal(recurring / reports.len() as f64 * 100.0)
}

fn location_key(location: &str) -> String {
    location.trim().to_lowercase()
}
