use chrono::NaiveDate;
use incident_analytics::analytics::{
    Report, ReportCsvImporter, ReportFilter, ReportId, ReportImportError, ReportStore, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local report store keyed by report id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    records: Arc<Mutex<HashMap<ReportId, Report>>>,
}

impl InMemoryReportStore {
    pub(crate) fn from_csv(path: &Path) -> Result<Self, ReportImportError> {
        let store = Self::default();
        let reports = ReportCsvImporter::from_path(path)?;
        ReportCsvImporter::load_into(&store, reports)?;
        Ok(store)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ReportId, Report>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("report store mutex poisoned".to_string()))
    }
}

impl ReportStore for InMemoryReportStore {
    fn fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        let guard = self.guard()?;
        Ok(guard
            .values()
            .filter(|report| filter.admits(report))
            .cloned()
            .collect())
    }

    fn insert(&self, report: Report) -> Result<Report, StoreError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&report.id) {
            return Err(StoreError::Conflict(report.id));
        }
        guard.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn mark_deleted(&self, id: &ReportId) -> Result<bool, StoreError> {
        let mut guard = self.guard()?;
        let report = guard
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let changed = !report.deleted;
        report.deleted = true;
        Ok(changed)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
