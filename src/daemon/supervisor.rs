//! Background process lifecycle
//!
//! The daemon is the same binary relaunched in `run` mode, detached from the
//! launching terminal with stdout/stderr appended to the log file. Liveness
//! is decided by probing the recorded pid, never by the pid file alone, so a
//! pid file left behind by a crash does not block the next start.

use crate::error::DaemonError;
use crate::orchestrator::process_alive;
use crate::state::{FactoryPaths, Ledger, LedgerRecord, LedgerSummary};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Program and arguments that start the poll loop in the foreground
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// This binary in `run` mode, bound to `config_dir`
    pub fn current_exe(config_dir: &Path) -> Result<Self, DaemonError> {
        let program = std::env::current_exe()?;
        Ok(Self::new(
            program,
            vec![
                "--config-dir".to_string(),
                config_dir.to_string_lossy().to_string(),
                "run".to_string(),
            ],
        ))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Snapshot reported by `factory status`
#[derive(Debug, Clone, Serialize)]
pub struct DaemonStatus {
    pub running: bool,
    /// Pid from the pid file, live or stale
    pub pid: Option<u32>,
    pub summary: LedgerSummary,
    pub records: Vec<(String, LedgerRecord)>,
}

pub struct Supervisor {
    paths: FactoryPaths,
    launch: LaunchCommand,
}

impl Supervisor {
    pub fn new(paths: FactoryPaths, launch: LaunchCommand) -> Self {
        Self { paths, launch }
    }

    pub fn paths(&self) -> &FactoryPaths {
        &self.paths
    }

    /// Pid recorded in the pid file; unreadable content counts as absent
    pub fn read_pid(&self) -> Option<u32> {
        let content = fs::read_to_string(self.paths.pid()).ok()?;
        content.trim().parse().ok()
    }

    /// Pid of the live daemon, if any
    pub fn running_pid(&self) -> Option<u32> {
        self.read_pid().filter(|pid| process_alive(*pid))
    }

    /// Launch the daemon and return its pid without waiting on it
    pub fn start(&self) -> Result<u32, DaemonError> {
        if let Some(pid) = self.running_pid() {
            return Err(DaemonError::AlreadyRunning { pid });
        }
        if let Some(stale) = self.read_pid() {
            tracing::debug!(pid = stale, "replacing stale pid file");
        }

        fs::create_dir_all(self.paths.root())?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.log())?;

        let mut cmd = Command::new(&self.launch.program);
        cmd.args(&self.launch.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log));
        detach(&mut cmd);

        let child = cmd.spawn().map_err(|source| DaemonError::Spawn {
            program: self.launch.program.display().to_string(),
            source,
        })?;
        let pid = child.id();
        fs::write(self.paths.pid(), pid.to_string())?;
        tracing::info!(pid, "daemon started");
        Ok(pid)
    }

    /// Signal the daemon to terminate and remove the pid file
    pub fn stop(&self) -> Result<u32, DaemonError> {
        let pid = self.read_pid().ok_or(DaemonError::NotRunning)?;
        if process_alive(pid) {
            terminate(pid)?;
        } else {
            tracing::warn!(pid, "daemon was not alive, removing stale pid file");
        }
        fs::remove_file(self.paths.pid())?;
        Ok(pid)
    }

    /// Liveness plus ledger summary; read-only
    pub fn status(&self) -> DaemonStatus {
        let pid = self.read_pid();
        let ledger = Ledger::open(self.paths.ledger());
        DaemonStatus {
            running: pid.map(process_alive).unwrap_or(false),
            pid,
            summary: ledger.summary(),
            records: ledger
                .records()
                .map(|(key, record)| (key.clone(), record.clone()))
                .collect(),
        }
    }
}

/// Put the child in its own process group so terminal signals skip it
#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

/// SIGTERM, escalating to SIGKILL if the signal cannot be delivered
#[cfg(unix)]
fn terminate(pid: u32) -> Result<(), DaemonError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let target = Pid::from_raw(pid as i32);
    match kill(target, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => {
            tracing::warn!(pid, error = %e, "SIGTERM failed, sending SIGKILL");
            match kill(target, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => Err(DaemonError::Io(std::io::Error::from(e))),
            }
        }
    }
}

#[cfg(windows)]
fn terminate(pid: u32) -> Result<(), DaemonError> {
    let status = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()?;
    if !status.success() {
        return Err(DaemonError::Io(std::io::Error::other(format!(
            "taskkill exited with {}",
            status
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn supervisor(temp: &TempDir) -> Supervisor {
        Supervisor::new(
            FactoryPaths::new(temp.path()),
            LaunchCommand::new("true", vec![]),
        )
    }

    #[test]
    fn test_read_pid_ignores_garbage() {
        let temp = TempDir::new().unwrap();
        let sup = supervisor(&temp);
        assert_eq!(sup.read_pid(), None);

        fs::write(sup.paths().pid(), "not a pid").unwrap();
        assert_eq!(sup.read_pid(), None);

        fs::write(sup.paths().pid(), "4242\n").unwrap();
        assert_eq!(sup.read_pid(), Some(4242));
    }

    #[test]
    fn test_current_exe_forwards_config_dir() {
        let launch = LaunchCommand::current_exe(Path::new("/tmp/factory-home")).unwrap();
        assert_eq!(launch.args(), ["--config-dir", "/tmp/factory-home", "run"]);
    }

    #[test]
    fn test_status_without_daemon_or_ledger() {
        let temp = TempDir::new().unwrap();
        let status = supervisor(&temp).status();
        assert!(!status.running);
        assert_eq!(status.pid, None);
        assert_eq!(status.summary.total, 0);
    }
}
