//! On-disk layout of a factory config directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const LEDGER_FILE: &str = "processed.json";
const PID_FILE: &str = "daemon.pid";
const LOG_FILE: &str = "daemon.log";

/// Paths of everything factory keeps under one config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryPaths {
    root: PathBuf,
}

impl FactoryPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default config directory (~/.factory)
    pub fn default_root() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".factory"))
    }

    /// Use `root` if given, otherwise ~/.factory
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        match root {
            Some(root) => Ok(Self::new(root)),
            None => Ok(Self::new(Self::default_root()?)),
        }
    }

    /// Create the config directory if it doesn't exist
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn ledger(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn pid(&self) -> PathBuf {
        self.root.join(PID_FILE)
    }

    pub fn log(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = FactoryPaths::new("/tmp/factory-home");
        assert_eq!(paths.config(), PathBuf::from("/tmp/factory-home/config.toml"));
        assert_eq!(paths.ledger(), PathBuf::from("/tmp/factory-home/processed.json"));
        assert_eq!(paths.pid(), PathBuf::from("/tmp/factory-home/daemon.pid"));
        assert_eq!(paths.log(), PathBuf::from("/tmp/factory-home/daemon.log"));
    }

    #[test]
    fn test_resolve_explicit_root() {
        let paths = FactoryPaths::resolve(Some(PathBuf::from("/srv/factory"))).unwrap();
        assert_eq!(paths.root(), Path::new("/srv/factory"));
    }
}
