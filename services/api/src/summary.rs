use crate::infra::InMemoryReportStore;
use chrono::NaiveDate;
use clap::Args;
use incident_analytics::analytics::{AnalyticsDashboard, IncidentAnalyticsService, WindowQuery};
use incident_analytics::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// CSV export of incident reports
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Named range: 7d, 30d, 90d, 6m, or 1y (defaults to the last 30 days)
    #[arg(long)]
    pub(crate) date_range: Option<String>,
    /// Window start (YYYY-MM-DD); requires --end-date and overrides --date-range
    #[arg(long, value_parser = crate::infra::parse_date, requires = "end_date")]
    pub(crate) start_date: Option<NaiveDate>,
    /// Window end, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date, requires = "start_date")]
    pub(crate) end_date: Option<NaiveDate>,
    /// Restrict every metric to one department ("all" for every department)
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Print the dashboard payload as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        csv,
        date_range,
        start_date,
        end_date,
        department,
        json,
    } = args;

    let store = InMemoryReportStore::from_csv(&csv)?;
    let service = IncidentAnalyticsService::new(Arc::new(store));
    let query = WindowQuery {
        date_range,
        start_date: start_date.map(|date| date.to_string()),
        end_date: end_date.map(|date| date.to_string()),
        department,
    };
    let dashboard = service.dashboard(&query).await?;

    if json {
        match serde_json::to_string_pretty(&dashboard) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Dashboard payload unavailable: {err}"),
        }
    } else {
        render_dashboard(&dashboard);
    }

    Ok(())
}

pub(crate) fn render_dashboard(dashboard: &AnalyticsDashboard) {
    let window = &dashboard.window;
    println!("Incident analytics");
    println!(
        "Window: {} -> {} (previous {} -> {}), department {}",
        window.start.format("%Y-%m-%d %H:%M"),
        window.end.format("%Y-%m-%d %H:%M"),
        window.previous_start.format("%Y-%m-%d"),
        window.previous_end.format("%Y-%m-%d"),
        window.department
    );

    println!(
        "\nReports: {} (previous {}, {:+.1}%)",
        dashboard.totals.current, dashboard.totals.previous, dashboard.totals.change_pct
    );
    println!(
        "Severe: {} (previous {}, {:+.1}%)",
        dashboard.severe.current, dashboard.severe.previous, dashboard.severe.change_pct
    );
    println!(
        "Recurrence rate: {:.1}% (previous {:.1}%)",
        dashboard.recurrence.current, dashboard.recurrence.previous
    );

    if dashboard.by_category.is_empty() {
        println!("\nCategories: none");
    } else {
        println!("\nCategories");
        for entry in &dashboard.by_category {
            println!("- {}: {}", entry.label, entry.incidents);
        }
    }

    println!("\nImpact");
    for entry in &dashboard.by_severity {
        println!("- {}: {}", entry.label, entry.incidents);
    }

    println!("\nReport types");
    for entry in &dashboard.by_report_type {
        println!("- {}: {}", entry.label, entry.incidents);
    }

    if !dashboard.by_department.is_empty() {
        println!("\nDepartments");
        for entry in &dashboard.by_department {
            println!("- {}: {}", entry.label, entry.incidents);
        }
    }

    let busiest = dashboard
        .by_hour
        .iter()
        .filter(|bucket| bucket.incidents > 0)
        .max_by_key(|bucket| bucket.incidents);
    match busiest {
        Some(bucket) => println!(
            "\nBusiest hour: {:02}:00 ({} reports)",
            bucket.hour, bucket.incidents
        ),
        None => println!("\nBusiest hour: n/a"),
    }
}
