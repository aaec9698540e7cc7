use super::super::domain::{ImpactLevel, Report, ReportCategory, ReportId, ReportType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
#[error("row {line}: {reason}")]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug)]
pub enum ParseFailure {
    Csv(csv::Error),
    Row(RowError),
}

pub(crate) fn parse_reports<R: Read>(reader: R) -> Result<Vec<Report>, ParseFailure> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(ParseFailure::Csv)?.clone();
    let mut reports = Vec::new();

    for record in csv_reader.records() {
        let record = record.map_err(ParseFailure::Csv)?;
        // Where the record starts in the file; quoted cells may span lines.
        let line = record
            .position()
            .map_or(reports.len() as u64 + 2, |position| position.line());
        let row: ReportRow = record
            .deserialize(Some(&headers))
            .map_err(ParseFailure::Csv)?;
        let report = row
            .into_report()
            .map_err(|reason| ParseFailure::Row(RowError { line, reason }))?;
        reports.push(report);
    }

    Ok(reports)
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "Report ID")]
    id: String,
    #[serde(rename = "Report Type")]
    report_type: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Impact")]
    impact: String,
    #[serde(rename = "Occurred At")]
    occurred_at: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Location", default)]
    location: String,
    #[serde(
        rename = "Subcategory",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    subcategory: Option<String>,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Deleted", default, deserialize_with = "flag")]
    deleted: bool,
}

impl ReportRow {
    fn into_report(self) -> Result<Report, String> {
        if self.id.is_empty() {
            return Err("missing Report ID".to_string());
        }
        let occurred_at = parse_datetime(&self.occurred_at)
            .ok_or_else(|| format!("unparseable Occurred At '{}'", self.occurred_at))?;

        Ok(Report {
            id: ReportId(self.id),
            report_type: self
                .report_type
                .parse::<ReportType>()
                .map_err(|err| err.to_string())?,
            category: self
                .category
                .parse::<ReportCategory>()
                .map_err(|err| err.to_string())?,
            impact: self
                .impact
                .parse::<ImpactLevel>()
                .map_err(|err| err.to_string())?,
            occurred_at,
            department: self.department,
            location: self.location,
            subcategory: self.subcategory,
            description: self.description,
            deleted: self.deleted,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("false") | Some("no") | Some("0") => Ok(false),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid Deleted flag '{other}'"
        ))),
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_datetime(value)
}
