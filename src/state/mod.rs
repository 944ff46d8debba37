//! Persistent state under the config directory
//!
//! - `processed.json`: the processing ledger
//! - `daemon.pid` / `daemon.log`: daemon bookkeeping (see `crate::daemon`)

mod ledger;
mod paths;

pub use ledger::{Ledger, LedgerRecord, LedgerStatus, LedgerSummary};
pub use paths::FactoryPaths;
