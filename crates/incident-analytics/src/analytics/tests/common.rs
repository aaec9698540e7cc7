use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::analytics::domain::{ImpactLevel, Report, ReportCategory, ReportId, ReportType};
use crate::analytics::store::{ReportStore, StoreError};
use crate::analytics::window::{ReportFilter, WindowQuery};
use crate::analytics::{analytics_router, IncidentAnalyticsService};

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("ir-{id:06}"))
}

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn report(category: ReportCategory, impact: ImpactLevel, location: &str) -> Report {
    Report {
        id: next_report_id(),
        report_type: ReportType::Incident,
        category,
        impact,
        occurred_at: at(2025, 9, 10, 10),
        department: "Medical Ward".to_string(),
        location: location.to_string(),
        subcategory: None,
        description: "Filed during shift handover".to_string(),
        deleted: false,
    }
}

pub(crate) fn report_at(
    category: ReportCategory,
    location: &str,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
) -> Report {
    Report {
        occurred_at: at(year, month, day, hour),
        ..report(category, ImpactLevel::Minor, location)
    }
}

/// Explicit September 2025 window used by most scenarios.
pub(crate) fn september() -> WindowQuery {
    WindowQuery {
        date_range: None,
        start_date: Some("2025-09-01".to_string()),
        end_date: Some("2025-09-30".to_string()),
        department: None,
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    at(2025, 10, 15, 12)
}

/// Store that honours the filtering contract.
#[derive(Default, Clone)]
pub(crate) struct MemoryStore {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl MemoryStore {
    pub(crate) fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: Arc::new(Mutex::new(reports)),
        }
    }
}

impl ReportStore for MemoryStore {
    fn fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        let guard = self.reports.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|report| filter.admits(report))
            .cloned()
            .collect())
    }

    fn insert(&self, report: Report) -> Result<Report, StoreError> {
        let mut guard = self.reports.lock().expect("store mutex poisoned");
        if guard.iter().any(|existing| existing.id == report.id) {
            return Err(StoreError::Conflict(report.id));
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn mark_deleted(&self, id: &ReportId) -> Result<bool, StoreError> {
        let mut guard = self.reports.lock().expect("store mutex poisoned");
        let report = guard
            .iter_mut()
            .find(|report| &report.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let changed = !report.deleted;
        report.deleted = true;
        Ok(changed)
    }
}

/// Store that ignores the filter and hands back everything it holds.
pub(crate) struct UnfilteredStore(pub(crate) Vec<Report>);

impl ReportStore for UnfilteredStore {
    fn fetch_reports(&self, _filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        Ok(self.0.clone())
    }

    fn insert(&self, report: Report) -> Result<Report, StoreError> {
        Ok(report)
    }

    fn mark_deleted(&self, _id: &ReportId) -> Result<bool, StoreError> {
        Ok(false)
    }
}

/// Store that files one more September report on every read, like a ward
/// submitting while a dashboard is being built.
#[derive(Default)]
pub(crate) struct GrowingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
}

impl GrowingStore {
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ReportStore for GrowingStore {
    fn fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        let hour = (read % 24) as u32;
        self.inner.insert(Report {
            impact: ImpactLevel::Major,
            ..report_at(ReportCategory::Fall, "Ward 7", 2025, 9, 15, hour)
        })?;
        self.inner.fetch_reports(filter)
    }

    fn insert(&self, report: Report) -> Result<Report, StoreError> {
        self.inner.insert(report)
    }

    fn mark_deleted(&self, id: &ReportId) -> Result<bool, StoreError> {
        self.inner.mark_deleted(id)
    }
}

pub(crate) struct UnavailableStore;

impl ReportStore for UnavailableStore {
    fn fetch_reports(&self, _filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _report: Report) -> Result<Report, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn mark_deleted(&self, _id: &ReportId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(crate) fn service_with(reports: Vec<Report>) -> IncidentAnalyticsService<MemoryStore> {
    IncidentAnalyticsService::new(Arc::new(MemoryStore::with_reports(reports)))
}

pub(crate) fn router_with(reports: Vec<Report>) -> axum::Router {
    analytics_router(Arc::new(service_with(reports)))
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
