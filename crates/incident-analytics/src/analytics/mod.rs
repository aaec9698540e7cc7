//! Incident analytics: window resolution, aggregation, and the dashboard
//! endpoint that assembles them.

pub mod aggregate;
pub mod domain;
pub mod error;
pub mod import;
pub mod router;
pub mod service;
pub mod store;
pub mod views;
pub mod window;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{ImpactLevel, Report, ReportCategory, ReportId, ReportType};
pub use error::AnalyticsError;
pub use import::{ReportCsvImporter, ReportImportError};
pub use router::analytics_router;
pub use service::IncidentAnalyticsService;
pub use store::{ReportStore, StoreError};
pub use views::AnalyticsDashboard;
pub use window::{
    AnalyticsScope, DateRange, DepartmentFilter, ReportFilter, ReportWindow, WindowQuery,
};
