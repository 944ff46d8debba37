//! Poller - periodic tick over assigned items
//!
//! Each tick fetches assigned items, drops keys already in the ledger and
//! runs the pipeline on the rest one at a time, saving the ledger after every
//! item. Ticks never overlap: the next one is scheduled only after the
//! previous one returns.

use super::Pipeline;
use crate::models::RunResult;
use crate::state::{Ledger, LedgerRecord};
use crate::tracker::Tracker;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// What one tick did
#[derive(Debug, Default)]
pub struct TickReport {
    /// Items returned by the tracker
    pub fetched: usize,
    /// Items skipped because the ledger already has them
    pub skipped: usize,
    pub results: Vec<RunResult>,
}

pub struct Poller {
    pipeline: Pipeline,
    tracker: Arc<dyn Tracker>,
    ledger: Ledger,
}

impl Poller {
    pub fn new(pipeline: Pipeline, tracker: Arc<dyn Tracker>, ledger: Ledger) -> Self {
        Self {
            pipeline,
            tracker,
            ledger,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// One poll iteration
    ///
    /// Fails only when the tracker cannot be queried or the ledger cannot be
    /// written; pipeline failures are recorded, not returned.
    pub async fn tick(&mut self) -> Result<TickReport> {
        // Pick up `clear` and `trigger` writes made since the last tick
        self.ledger.load();

        let items = self
            .tracker
            .fetch_assigned()
            .await
            .context("Failed to fetch assigned items")?;

        let mut report = TickReport {
            fetched: items.len(),
            ..TickReport::default()
        };
        tracing::info!(count = items.len(), "fetched assigned items");

        for item in items {
            // Also covers a key listed twice in one fetch
            if self.ledger.contains(&item.key) {
                report.skipped += 1;
                continue;
            }

            let result = self.pipeline.process(&item.key).await;
            self.ledger
                .record(item.key.clone(), LedgerRecord::from_result(&result, Utc::now()));
            self.ledger
                .save()
                .with_context(|| format!("Failed to save ledger after {}", item.key))?;
            report.results.push(result);
        }

        tracing::info!(
            processed = report.results.len(),
            skipped = report.skipped,
            "tick finished"
        );
        Ok(report)
    }

    /// Tick now, then once per `interval`, forever
    pub async fn run(&mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                tracing::error!(error = %format!("{:#}", e), "tick failed");
            }
        }
    }
}
