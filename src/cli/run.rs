//! Foreground poll loop; this is what `factory start` detaches

use crate::engine::Poller;
use crate::state::{FactoryPaths, Ledger};
use crate::Result;

pub async fn run(paths: &FactoryPaths) -> Result<()> {
    let config = super::load_config(paths)?;
    let (pipeline, tracker) = super::build_pipeline(&config, paths, false)?;
    let ledger = Ledger::open(paths.ledger());
    let interval = config.poll.interval();

    println!("factory daemon v{}", env!("CARGO_PKG_VERSION"));
    println!("  config:   {}", paths.root().display());
    println!("  interval: {} minute(s)", interval.as_secs() / 60);
    println!(
        "  tracker:  {}",
        if config.jira.use_cli { "jira cli" } else { "jira rest" }
    );
    println!(
        "  codehost: {}",
        if config.github.use_cli { "gh cli" } else { "github rest" }
    );
    tracing::info!(pid = std::process::id(), ledger = ledger.len(), "daemon running");

    let mut poller = Poller::new(pipeline, tracker, ledger);
    tokio::select! {
        _ = poller.run(interval) => {}
        signal = shutdown_signal() => {
            tracing::info!(signal, "shutting down");
        }
    }

    release_pid_file(paths);
    Ok(())
}

/// Remove the pid file if it still names this process
fn release_pid_file(paths: &FactoryPaths) {
    let ours = std::fs::read_to_string(paths.pid())
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
        == Some(std::process::id());
    if ours {
        if let Err(e) = std::fs::remove_file(paths.pid()) {
            tracing::warn!(error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
        tracing::warn!("failed to register SIGTERM handler");
        let _ = tokio::signal::ctrl_c().await;
        return "SIGINT";
    };
    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl-C"
}
