use crate::daemon::{DaemonStatus, LaunchCommand, Supervisor};
use crate::state::{FactoryPaths, LedgerRecord, LedgerStatus};
use crate::Result;
use chrono::Local;
use colored::Colorize;

const DETAIL_WIDTH: usize = 38;

pub fn run(paths: &FactoryPaths, json: bool) -> Result<()> {
    let launch = LaunchCommand::current_exe(paths.root())?;
    let status = Supervisor::new(paths.clone(), launch).status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_daemon(&status);
    println!();

    if status.records.is_empty() {
        println!("No processed issues");
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Processed Issues ({}): {} completed, {} failed",
            status.summary.total, status.summary.completed, status.summary.failed
        )
        .cyan()
        .bold()
    );
    println!("{:<12} {:<10} {:<40} {}", "Issue", "Status", "PR/Error", "When");
    println!("{}", "-".repeat(80));
    for (key, record) in &status.records {
        println!("{}", row(key, record));
    }
    Ok(())
}

fn print_daemon(status: &DaemonStatus) {
    match (status.running, status.pid) {
        (true, Some(pid)) => {
            println!("Daemon: {} (PID {})", "Running".green(), pid)
        }
        (false, Some(pid)) => println!(
            "Daemon: {} (stale pid file, PID {})",
            "Stopped".yellow(),
            pid
        ),
        _ => println!("Daemon: {}", "Stopped".yellow()),
    }
}

/// Shorten `detail` to the column width, marking the cut
fn truncate(detail: &str) -> String {
    if detail.chars().count() > DETAIL_WIDTH {
        let cut: String = detail.chars().take(DETAIL_WIDTH).collect();
        format!("{}...", cut)
    } else {
        detail.to_string()
    }
}

fn row(key: &str, record: &LedgerRecord) -> String {
    let mark = match record.status {
        LedgerStatus::Completed => "✓",
        LedgerStatus::Failed => "✗",
    };
    let detail = record
        .pr_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .or(record.error.as_deref())
        .unwrap_or("");
    let when = record
        .processed_at
        .with_timezone(&Local)
        .format("%b %d %H:%M");
    format!("{:<12} {:<10} {:<40} {}", key, mark, truncate(detail), when)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(50);
        let cut = truncate(&long);
        assert_eq!(cut.len(), DETAIL_WIDTH + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_row_prefers_pr_url_over_error() {
        let record = LedgerRecord {
            processed_at: Utc::now(),
            status: LedgerStatus::Completed,
            pr_url: Some("https://github.com/acme/widgets/pull/7".to_string()),
            error: None,
        };
        let line = row("PROJ-1", &record);
        assert!(line.starts_with("PROJ-1"));
        assert!(line.contains("✓"));
        assert!(line.contains("https://github.com/acme/widgets/pull/7"));
    }

    #[test]
    fn test_row_shows_error_for_failure() {
        let record = LedgerRecord {
            processed_at: Utc::now(),
            status: LedgerStatus::Failed,
            pr_url: None,
            error: Some("validate: invalid type: Epic".to_string()),
        };
        let line = row("PROJ-2", &record);
        assert!(line.contains("✗"));
        assert!(line.contains("validate: invalid type: Epic"));
    }
}
