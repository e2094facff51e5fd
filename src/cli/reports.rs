//! Report commands: windowed summary and CSV export.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::PathBuf;

use crate::cli::{render, require_admin, App};
use crate::reports::{self, DateRange, ReportSummary};
use crate::store::Workspace;

#[derive(Subcommand, Debug)]
pub enum ReportsCommands {
    /// Aggregate figures for a date window (defaults to the current month)
    Summary {
        /// Window start, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Window end, YYYY-MM-DD (inclusive)
        #[arg(long)]
        end: Option<String>,
    },

    /// Export the window as CSV
    Export {
        /// Window start, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Window end, YYYY-MM-DD (inclusive)
        #[arg(long)]
        end: Option<String>,
        /// Output file (defaults to repair_report_<start>_<end>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let default = DateRange::current_month();
    let parse = |label: &str, raw: Option<&str>, fallback: NaiveDate| -> Result<NaiveDate> {
        match raw {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("invalid --{} date '{}'; expected YYYY-MM-DD", label, raw)),
            None => Ok(fallback),
        }
    };
    let start = parse("start", start, default.start)?;
    let end = parse("end", end, default.end)?;
    if end < start {
        anyhow::bail!("--end {} is before --start {}", end, start);
    }
    Ok(DateRange::new(start, end))
}

pub async fn run(app: &mut App, cmd: &ReportsCommands) -> Result<()> {
    let session = app.session().await?;
    require_admin(&session)?;

    match cmd {
        ReportsCommands::Summary { start, end } => {
            let range = parse_range(start.as_deref(), end.as_deref())?;
            let workspace = Workspace::refresh(&app.client, &session)
                .await
                .context("Failed to load report data")?;
            let window = range.filter(&workspace.requests);
            let summary = ReportSummary::compute(&window);

            println!();
            println!("=== Report {} to {} ===", range.start, range.end);
            println!();
            println!("  Total:        {}", summary.total);
            println!("  Pending:      {}", summary.pending);
            println!("  Assigned:     {}", summary.assigned);
            println!("  In progress:  {}", summary.in_progress);
            println!("  Completed:    {}", summary.completed);
            println!("  Cancelled:    {}", summary.cancelled);
            println!();
            println!("  Completion rate: {:.1}%", summary.completion_rate());
            println!();
            println!("  Estimated cost: {}", render::money(summary.estimated_cost));
            println!("  Actual cost:    {}", render::money(summary.actual_cost));
            let variance = summary.cost_variance();
            println!(
                "  Variance:       {} ({})",
                render::money(variance.abs()),
                if variance > 0.0 { "over" } else { "under or on budget" }
            );

            let ranks = reports::top_technicians(&window, &workspace.users, 5);
            if !ranks.is_empty() {
                println!();
                println!("Top technicians (completed in window):");
                for (place, rank) in ranks.iter().enumerate() {
                    println!("  {}. {:<24} {}", place + 1, rank.full_name, rank.completed);
                }
            }
            Ok(())
        }

        ReportsCommands::Export { start, end, output } => {
            let range = parse_range(start.as_deref(), end.as_deref())?;
            let workspace = Workspace::refresh(&app.client, &session)
                .await
                .context("Failed to load report data")?;
            let window = range.filter(&workspace.requests);

            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(reports::export_file_name(&range)));
            reports::export_csv(&window, &path)?;
            app.notices.success(format!(
                "exported {} request(s) to {}",
                window.len(),
                path.display()
            ));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_accepts_iso_dates() {
        let range = parse_range(Some("2025-06-01"), Some("2025-06-30")).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_parse_range_rejects_inverted_window() {
        assert!(parse_range(Some("2025-06-30"), Some("2025-06-01")).is_err());
    }

    #[test]
    fn test_parse_range_rejects_bad_format() {
        assert!(parse_range(Some("30/06/2025"), None).is_err());
    }
}
