use super::super::domain::{ImpactLevel, Report, ReportCategory, ReportType};
use super::super::views::{
    CategoryCount, CrossTabRow, HourCount, LabelCount, ReportTypeCount, SeverityCount,
};
use chrono::Timelike;
use std::collections::{BTreeMap, HashMap};

/// Bucket for reports with no sub-detail recorded.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// Categories with at least one report, busiest first.
pub fn category_histogram(reports: &[Report]) -> Vec<CategoryCount> {
    let mut counts: HashMap<ReportCategory, usize> = HashMap::new();
    for report in reports {
        *counts.entry(report.category).or_default() += 1;
    }

    let mut histogram: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, incidents)| CategoryCount {
            category,
            label: category.label(),
            incidents,
        })
        .collect();
    histogram.sort_by(|a, b| {
        b.incidents
            .cmp(&a.incidents)
            .then_with(|| a.category.cmp(&b.category))
    });
    histogram
}

/// Every impact level in ordinal order, including empty ones.
pub fn severity_histogram(reports: &[Report]) -> Vec<SeverityCount> {
    ImpactLevel::ordered()
        .into_iter()
        .map(|impact| SeverityCount {
            impact,
            label: impact.label(),
            incidents: reports
                .iter()
                .filter(|report| report.impact == impact)
                .count(),
        })
        .collect()
}

/// Always 24 buckets so chart axes stay stable.
pub fn hour_histogram(reports: &[Report]) -> Vec<HourCount> {
    let mut buckets = [0usize; 24];
    for report in reports {
        buckets[report.occurred_at.hour() as usize] += 1;
    }

    buckets
        .iter()
        .enumerate()
        .map(|(hour, incidents)| HourCount {
            hour: hour as u32,
            incidents: *incidents,
        })
        .collect()
}

pub fn subcategory_histogram(reports: &[Report]) -> Vec<LabelCount> {
    label_histogram(reports.iter().map(|report| {
        report
            .subcategory
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNSPECIFIED_LABEL)
    }))
}

pub fn department_histogram(reports: &[Report]) -> Vec<LabelCount> {
    label_histogram(reports.iter().map(|report| {
        let department = report.department.trim();
        if department.is_empty() {
            UNSPECIFIED_LABEL
        } else {
            department
        }
    }))
}

pub fn report_type_histogram(reports: &[Report]) -> Vec<ReportTypeCount> {
    ReportType::ordered()
        .into_iter()
        .map(|report_type| ReportTypeCount {
            report_type,
            label: report_type.label(),
            incidents: reports
                .iter()
                .filter(|report| report.report_type == report_type)
                .count(),
        })
        .collect()
}

/// Category × impact counts for stacked charts. Rows exist only for
/// categories with reports; each row carries every impact level, mildest
/// first.
pub fn cross_tabulation(reports: &[Report]) -> Vec<CrossTabRow> {
    let mut grid: BTreeMap<ReportCategory, BTreeMap<ImpactLevel, usize>> = BTreeMap::new();
    for report in reports {
        *grid
            .entry(report.category)
            .or_default()
            .entry(report.impact)
            .or_default() += 1;
    }

    grid.into_iter()
        .map(|(category, counts)| {
            let by_severity: Vec<SeverityCount> = ImpactLevel::ordered()
                .into_iter()
                .map(|impact| SeverityCount {
                    impact,
                    label: impact.label(),
                    incidents: counts.get(&impact).copied().unwrap_or(0),
                })
                .collect();
            CrossTabRow {
                category,
                label: category.label(),
                total: by_severity.iter().map(|cell| cell.incidents).sum(),
                by_severity,
            }
        })
        .collect()
}

fn label_histogram<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut histogram: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, incidents)| LabelCount {
            label: label.to_string(),
            incidents,
        })
        .collect();
    histogram.sort_by(|a, b| {
        b.incidents
            .cmp(&a.incidents)
            .then_with(|| a.label.cmp(&b.label))
    });
    histogram
}
