use crate::state::FactoryPaths;
use crate::Result;
use colored::Colorize;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const FOLLOW_POLL: Duration = Duration::from_millis(500);

/// Print the last `lines` of the daemon log, then keep printing appended
/// output until Ctrl-C when `follow` is set
pub async fn run(paths: &FactoryPaths, lines: usize, follow: bool) -> Result<()> {
    let log_path = paths.log();
    if !log_path.exists() {
        println!(
            "{}",
            format!("⚠️  No log file at {}", log_path.display()).yellow()
        );
        return Ok(());
    }

    let content = tokio::fs::read(&log_path).await?;
    let text = String::from_utf8_lossy(&content);
    for line in last_lines(&text, lines) {
        println!("{}", line);
    }

    if !follow {
        return Ok(());
    }

    tokio::select! {
        res = follow_file(&log_path, content.len() as u64) => res,
        _ = tokio::signal::ctrl_c() => Ok(()),
    }
}

/// The final `n` lines of `text`
fn last_lines(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].to_vec()
}

async fn follow_file(path: &Path, mut offset: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(FOLLOW_POLL);
    let mut stdout = tokio::io::stdout();

    loop {
        ticker.tick().await;
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            continue;
        };
        let len = metadata.len();
        if len < offset {
            // truncated or replaced
            offset = 0;
        }
        if len == offset {
            continue;
        }

        let mut file = tokio::fs::File::open(path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        let mut appended = Vec::new();
        file.read_to_end(&mut appended).await?;
        offset += appended.len() as u64;

        stdout.write_all(&appended).await?;
        stdout.flush().await?;
    }
}
