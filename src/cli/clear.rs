use crate::state::{FactoryPaths, Ledger};
use crate::Result;
use colored::Colorize;

/// Remove one key from the ledger, or every key when `key` is `None`
pub fn run(paths: &FactoryPaths, key: Option<&str>) -> Result<()> {
    let mut ledger = Ledger::open(paths.ledger());

    match key.filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            if ledger.clear(key) {
                ledger.save()?;
                println!("{}", format!("✓ Cleared {}", key).green());
            } else {
                println!("{}", format!("⚠️  {} is not in the ledger", key).yellow());
            }
        }
        None => {
            let count = ledger.len();
            ledger.clear_all();
            ledger.save()?;
            println!(
                "{}",
                format!("✓ Cleared {} processed item(s)", count).green()
            );
        }
    }
    Ok(())
}
