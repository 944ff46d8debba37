use crate::models::RunResult;
use crate::state::{FactoryPaths, Ledger, LedgerRecord};
use crate::Result;
use chrono::Utc;
use colored::Colorize;
use std::io::IsTerminal;

/// Process one item now, bypassing the poller, and record the outcome
///
/// Returns the result so the caller can map it to an exit code.
pub async fn run(paths: &FactoryPaths, key: &str) -> Result<RunResult> {
    let config = super::load_config(paths)?;
    let interactive = std::io::stdout().is_terminal();
    let (pipeline, _) = super::build_pipeline(&config, paths, interactive)?;

    println!("{}", format!("🔨 Processing {}...", key).cyan());
    let result = pipeline.process(key).await;

    let mut ledger = Ledger::open(paths.ledger());
    ledger.record(key, LedgerRecord::from_result(&result, Utc::now()));
    ledger.save()?;

    match (&result.pr_url, result.error()) {
        (_, Some(error)) => println!("{}", format!("✗ {} failed: {}", key, error).red()),
        (Some(url), None) => println!("{}", format!("✓ {} completed: {}", key, url).green()),
        (None, None) => println!(
            "{}",
            format!("✓ {} completed (no changes to publish)", key).green()
        ),
    }
    Ok(result)
}
