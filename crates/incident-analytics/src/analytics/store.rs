use super::domain::{Report, ReportId};
use super::window::ReportFilter;

/// Data-access capability behind the aggregators.
///
/// Implementations must return only reports the filter admits; the service
/// re-applies [`ReportFilter::admits`] regardless.
pub trait ReportStore: Send + Sync {
    fn fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError>;
    fn insert(&self, report: Report) -> Result<Report, StoreError>;
    /// Flags a report as logically deleted. Returns whether the flag changed.
    fn mark_deleted(&self, id: &ReportId) -> Result<bool, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("report {0} already exists")]
    Conflict(ReportId),
    #[error("report {0} not found")]
    NotFound(ReportId),
    #[error("report store unavailable: {0}")]
    Unavailable(String),
}
