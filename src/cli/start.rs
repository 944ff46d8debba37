use crate::daemon::{LaunchCommand, Supervisor};
use crate::state::FactoryPaths;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &FactoryPaths) -> Result<()> {
    // Fail here rather than in the detached process where nobody sees it
    let config = super::load_config(paths)?;

    let launch = LaunchCommand::current_exe(paths.root())?;
    let supervisor = Supervisor::new(paths.clone(), launch);
    let pid = supervisor.start()?;

    println!(
        "{}",
        format!("✓ Daemon started (PID: {})", pid).green()
    );
    println!(
        "   Polling every {} minute(s)",
        config.poll.interval().as_secs() / 60
    );
    println!("   Logs: {}", paths.log().display());
    Ok(())
}
