//! Daemon supervisor: single background poller per config directory

mod supervisor;

pub use supervisor::{DaemonStatus, LaunchCommand, Supervisor};
