mod parser;

use super::domain::Report;
use super::store::{ReportStore, StoreError};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub use parser::RowError;

#[derive(Debug)]
pub enum ReportImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row(RowError),
    Store(StoreError),
}

impl std::fmt::Display for ReportImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportImportError::Io(err) => write!(f, "failed to read report export: {}", err),
            ReportImportError::Csv(err) => write!(f, "invalid report CSV data: {}", err),
            ReportImportError::Row(err) => write!(f, "invalid report record: {}", err),
            ReportImportError::Store(err) => {
                write!(f, "could not load reports into the store: {}", err)
            }
        }
    }
}

impl std::error::Error for ReportImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportImportError::Io(err) => Some(err),
            ReportImportError::Csv(err) => Some(err),
            ReportImportError::Row(err) => Some(err),
            ReportImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ReportImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReportImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StoreError> for ReportImportError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<parser::ParseFailure> for ReportImportError {
    fn from(failure: parser::ParseFailure) -> Self {
        match failure {
            parser::ParseFailure::Csv(err) => Self::Csv(err),
            parser::ParseFailure::Row(err) => Self::Row(err),
        }
    }
}

/// Reads report exports in the hospital's CSV layout.
pub struct ReportCsvImporter;

impl ReportCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Report>, ReportImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reports = Self::from_reader(file)?;
        info!(path = %path.display(), count = reports.len(), "loaded report export");
        Ok(reports)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Report>, ReportImportError> {
        Ok(parser::parse_reports(reader)?)
    }

    /// Inserts every parsed report, stopping at the first store failure.
    pub fn load_into<S: ReportStore + ?Sized>(
        store: &S,
        reports: Vec<Report>,
    ) -> Result<usize, ReportImportError> {
        let mut loaded = 0;
        for report in reports {
            debug!(report_id = %report.id, "seeding report");
            store.insert(report)?;
            loaded += 1;
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::{ImpactLevel, ReportCategory, ReportType};
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    const HEADER: &str = "Report ID,Report Type,Category,Impact,Occurred At,Department,Location,Subcategory,Description,Deleted\n";

    #[test]
    fn parse_datetime_supports_rfc3339_and_plain_formats() {
        let rfc = parser::parse_datetime_for_tests("2025-09-24T10:00:00Z").expect("parse rfc");
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap());

        let spaced = parser::parse_datetime_for_tests("2025-09-24 18:30").expect("parse spaced");
        assert_eq!(spaced, Utc.with_ymd_and_hms(2025, 9, 24, 18, 30, 0).unwrap());

        let date = parser::parse_datetime_for_tests("2025-09-30").expect("parse date");
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap());

        assert!(parser::parse_datetime_for_tests("yesterday").is_none());
    }

    #[test]
    fn imports_rows_with_optional_cells() {
        let csv = format!(
            "{HEADER}IR-1,Near Miss,Medication,Minor,2025-09-24T10:00:00Z,Pharmacy,Ward 3,Wrong dose,Caught at bedside,\n\
             IR-2,Incident,Fall,Major,2025-09-25 03:15,Emergency,Bay 2,,,yes\n"
        );

        let reports = ReportCsvImporter::from_reader(Cursor::new(csv)).expect("csv parses");
        assert_eq!(reports.len(), 2);

        let first = &reports[0];
        assert_eq!(first.report_type, ReportType::NearMiss);
        assert_eq!(first.category, ReportCategory::Medication);
        assert_eq!(first.subcategory.as_deref(), Some("Wrong dose"));
        assert!(!first.deleted);

        let second = &reports[1];
        assert_eq!(second.impact, ImpactLevel::Major);
        assert!(second.subcategory.is_none());
        assert!(second.description.is_empty());
        assert!(second.deleted);
    }

    #[test]
    fn reports_the_line_of_an_invalid_row() {
        let csv = format!(
            "{HEADER}IR-1,Incident,Fall,Minor,2025-09-24,ED,Bay 1,,,\n\
             IR-2,Incident,Teleportation,Minor,2025-09-24,ED,Bay 1,,,\n"
        );

        let err = ReportCsvImporter::from_reader(Cursor::new(csv)).expect_err("bad category");
        match err {
            ReportImportError::Row(row) => {
                assert_eq!(row.line, 3);
                assert!(row.reason.contains("Teleportation"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn multi_line_descriptions_keep_file_line_numbers() {
        let csv = format!(
            "{HEADER}IR-1,Incident,Fall,Minor,2025-09-24,ED,Bay 1,,\"Found on floor\nby night staff\",\n\
             IR-2,Incident,Teleportation,Minor,2025-09-24,ED,Bay 1,,,\n"
        );

        let err = ReportCsvImporter::from_reader(Cursor::new(csv)).expect_err("bad category");
        match err {
            ReportImportError::Row(row) => assert_eq!(row.line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }
}
