use crate::daemon::{LaunchCommand, Supervisor};
use crate::state::FactoryPaths;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &FactoryPaths) -> Result<()> {
    let launch = LaunchCommand::current_exe(paths.root())?;
    let pid = Supervisor::new(paths.clone(), launch).stop()?;
    println!(
        "{}",
        format!("✓ Daemon stopped (PID: {})", pid).green()
    );
    Ok(())
}
