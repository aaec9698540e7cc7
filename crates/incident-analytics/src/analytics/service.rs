use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::aggregate::{
    category_histogram, cross_tabulation, department_histogram, hour_histogram,
    percentage_change, recurrence_rate, report_type_histogram, severe_count, severity_histogram,
    subcategory_histogram, total_count, trend_series,
};
use super::domain::Report;
use super::error::AnalyticsError;
use super::store::ReportStore;
use super::views::{AnalyticsDashboard, RecurrenceRate, TrendCount, WindowView};
use super::window::{AnalyticsScope, ReportFilter, WindowQuery};

/// Service fanning the aggregators out over a report store.
pub struct IncidentAnalyticsService<S> {
    store: Arc<S>,
}

impl<S> IncidentAnalyticsService<S>
where
    S: ReportStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolve the query against the current time and build the dashboard.
    pub async fn dashboard(
        &self,
        query: &WindowQuery,
    ) -> Result<AnalyticsDashboard, AnalyticsError> {
        self.dashboard_at(query, Utc::now()).await
    }

    pub async fn dashboard_at(
        &self,
        query: &WindowQuery,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsDashboard, AnalyticsError> {
        let scope = query.resolve(now)?;
        self.assemble(scope).await
    }

    /// Read one snapshot per window, then run every aggregator over those
    /// snapshots concurrently. The first failure fails the whole dashboard;
    /// partial results are discarded.
    pub async fn assemble(&self, scope: AnalyticsScope) -> Result<AnalyticsDashboard, AnalyticsError> {
        let current = &scope.current;
        let previous = &scope.previous;
        let trend_window = current.window;

        let (now_reports, before_reports) =
            tokio::try_join!(self.snapshot(current), self.snapshot(previous))?;

        let (
            (total_now, total_before),
            (severe_now, severe_before),
            (recurrence_now, recurrence_before),
            trend,
            by_category,
            by_severity,
            by_hour,
            cross_tab,
            by_subcategory,
            by_department,
            by_report_type,
        ) = tokio::try_join!(
            compare("totals", &now_reports, &before_reports, total_count),
            compare("severe", &now_reports, &before_reports, severe_count),
            compare("recurrence", &now_reports, &before_reports, recurrence_rate),
            aggregate("trend", &now_reports, move |reports| {
                trend_series(reports, &trend_window)
            }),
            aggregate("by_category", &now_reports, category_histogram),
            aggregate("by_severity", &now_reports, severity_histogram),
            aggregate("by_hour", &now_reports, hour_histogram),
            aggregate("cross_tab", &now_reports, cross_tabulation),
            aggregate("by_subcategory", &now_reports, subcategory_histogram),
            aggregate("by_department", &now_reports, department_histogram),
            aggregate("by_report_type", &now_reports, report_type_histogram),
        )?;

        info!(
            start = %current.window.start,
            end = %current.window.end,
            department = %current.department,
            total = total_now,
            "analytics dashboard assembled"
        );

        Ok(AnalyticsDashboard {
            window: WindowView {
                start: current.window.start,
                end: current.window.end,
                previous_start: previous.window.start,
                previous_end: previous.window.end,
                date_range: scope.date_range,
                department: current.department.clone(),
            },
            totals: trend_count(total_now, total_before),
            severe: trend_count(severe_now, severe_before),
            recurrence: RecurrenceRate {
                current: recurrence_now,
                previous: recurrence_before,
                change_pct: percentage_change(recurrence_now, recurrence_before),
            },
            trend,
            by_category,
            by_severity,
            by_hour,
            cross_tab,
            by_subcategory,
            by_department,
            by_report_type,
        })
    }

    /// Single store read for one filter, taken on the blocking pool.
    async fn snapshot(&self, filter: &ReportFilter) -> Result<Arc<[Report]>, AnalyticsError> {
        let store = Arc::clone(&self.store);
        let filter = filter.clone();

        let job = tokio::task::spawn_blocking(move || fetch_admitted(store.as_ref(), &filter));
        let reports = joined("snapshot", job.await)?.map_err(|err| {
            warn!(error = %err, "report snapshot failed");
            err
        })?;
        debug!(reports = reports.len(), "report snapshot taken");
        Ok(reports.into())
    }
}

async fn compare<T, F>(
    metric: &'static str,
    current: &Arc<[Report]>,
    previous: &Arc<[Report]>,
    reduce: F,
) -> Result<(T, T), AnalyticsError>
where
    T: Send + 'static,
    F: Fn(&[Report]) -> T + Copy + Send + 'static,
{
    tokio::try_join!(
        aggregate(metric, current, reduce),
        aggregate(metric, previous, reduce),
    )
}

/// Reduce a shared snapshot on the blocking pool.
async fn aggregate<T, F>(
    metric: &'static str,
    reports: &Arc<[Report]>,
    reduce: F,
) -> Result<T, AnalyticsError>
where
    T: Send + 'static,
    F: FnOnce(&[Report]) -> T + Send + 'static,
{
    let reports = Arc::clone(reports);
    let job = tokio::task::spawn_blocking(move || {
        debug!(metric, reports = reports.len(), "aggregating");
        reduce(&reports[..])
    });
    joined(metric, job.await)
}

fn joined<T>(
    metric: &'static str,
    outcome: Result<T, tokio::task::JoinError>,
) -> Result<T, AnalyticsError> {
    outcome.map_err(|join_error| {
        warn!(metric, error = %join_error, "aggregator did not complete");
        AnalyticsError::Aggregation {
            metric,
            detail: join_error.to_string(),
        }
    })
}

/// Store read with the filter re-applied, so the invariant holds for any
/// store implementation.
fn fetch_admitted<S: ReportStore + ?Sized>(
    store: &S,
    filter: &ReportFilter,
) -> Result<Vec<Report>, AnalyticsError> {
    let reports = store.fetch_reports(filter)?;
    Ok(reports
        .into_iter()
        .filter(|report| filter.admits(report))
        .collect())
}

fn trend_count(current: usize, previous: usize) -> TrendCount {
    TrendCount {
        current,
        previous,
        change_pct: percentage_change(current as f64, previous as f64),
    }
}
