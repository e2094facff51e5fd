//! Client-side reporting: date-range aggregation and CSV export.
//!
//! Everything here works on an already-fetched request list; nothing is
//! persisted. Output is presentation data for the `reports` subcommands.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::path::Path;

use crate::domain::{RepairRequest, RequestStatus, User};

/// Closed date interval, inclusive on both bounds, compared against each
/// request's `created_at` calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// First day of the current month through today, the default report
    /// window.
    pub fn current_month() -> Self {
        let today = Local::now().date_naive();
        let start = today.with_day(1).unwrap_or(today);
        DateRange { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Requests created within the range. Requests whose `created_at` does
    /// not parse are excluded rather than guessed at.
    pub fn filter<'a>(&self, requests: &'a [RepairRequest]) -> Vec<&'a RepairRequest> {
        requests
            .iter()
            .filter(|req| req.created_date().is_some_and(|date| self.contains(date)))
            .collect()
    }
}

/// Aggregated figures for a report window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub pending: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub estimated_cost: f64,
    pub actual_cost: f64,
}

impl ReportSummary {
    pub fn compute(requests: &[&RepairRequest]) -> Self {
        let count = |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();
        ReportSummary {
            total: requests.len(),
            pending: count(RequestStatus::Pending),
            assigned: count(RequestStatus::Assigned),
            in_progress: count(RequestStatus::InProgress),
            completed: count(RequestStatus::Completed),
            cancelled: count(RequestStatus::Cancelled),
            estimated_cost: requests.iter().filter_map(|r| r.estimated_cost).sum(),
            actual_cost: requests.iter().filter_map(|r| r.actual_cost).sum(),
        }
    }

    /// Completed share of the window as a percentage; 0.0 for an empty
    /// window.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Actual minus estimated; positive means over budget.
    pub fn cost_variance(&self) -> f64 {
        self.actual_cost - self.estimated_cost
    }
}

/// A technician and their completed count within the report window.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicianRank {
    pub technician_id: i64,
    pub full_name: String,
    pub completed: usize,
}

/// Per-technician completed-request ranking, top `limit`, stable: ties keep
/// the order technicians appear in `users`.
pub fn top_technicians(
    requests: &[&RepairRequest],
    users: &[User],
    limit: usize,
) -> Vec<TechnicianRank> {
    let mut ranks: Vec<TechnicianRank> = users
        .iter()
        .filter(|u| u.is_technician())
        .map(|tech| TechnicianRank {
            technician_id: tech.id,
            full_name: tech.full_name.clone(),
            completed: requests
                .iter()
                .filter(|r| {
                    r.assigned_to == Some(tech.id) && r.status == RequestStatus::Completed
                })
                .count(),
        })
        .collect();
    ranks.sort_by(|a, b| b.completed.cmp(&a.completed));
    ranks.truncate(limit);
    ranks
}

// -------------------------------------------------------------------------
// CSV export
// -------------------------------------------------------------------------

const CSV_HEADER: [&str; 7] = [
    "Ticket",
    "Title",
    "Status",
    "Priority",
    "Requester",
    "Created",
    "Actual Cost",
];

/// Render the filtered request set as CSV: one header line plus one row per
/// request, dates as `DD/MM/YYYY`.
pub fn render_csv(requests: &[&RepairRequest]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).context("Failed to write CSV header")?;

    for req in requests {
        let created = req
            .created_date()
            .map(|date| date.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        writer
            .write_record([
                req.ticket_number.as_str(),
                req.title.as_str(),
                req.status.as_str(),
                req.priority.as_str(),
                req.requester_name.as_deref().unwrap_or(""),
                created.as_str(),
                &format!("{:.2}", req.actual_cost.unwrap_or(0.0)),
            ])
            .context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Default export file name for a report window.
pub fn export_file_name(range: &DateRange) -> String {
    format!("repair_report_{}_{}.csv", range.start, range.end)
}

/// Write the CSV export to `path`.
pub fn export_csv(requests: &[&RepairRequest], path: &Path) -> Result<()> {
    let content = render_csv(requests)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
