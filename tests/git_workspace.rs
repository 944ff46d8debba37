//! GitWorkspace against a local bare remote
#![cfg(unix)]

use factory::models::RepoConfig;
use factory::workspace::{GitWorkspace, Workspace};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

fn git(cwd: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {:?}: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Bare remote with one commit on `main`
fn remote(temp: &TempDir) -> String {
    let bare = temp.path().join("remote.git");
    let seed = temp.path().join("seed");
    std::fs::create_dir_all(&bare).unwrap();
    std::fs::create_dir_all(&seed).unwrap();

    git(&bare, &["init", "--bare", "--initial-branch=main"]);
    git(&seed, &["init", "--initial-branch=main"]);
    std::fs::write(seed.join("README.md"), "# widgets\n").unwrap();
    git(&seed, &["add", "-A"]);
    git(&seed, &["commit", "-m", "init"]);
    git(&seed, &["push", bare.to_str().unwrap(), "main"]);
    bare.to_string_lossy().to_string()
}

#[tokio::test]
async fn test_clone_branch_commit_push() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let url = remote(&temp);
    let root = temp.path().join("work");
    let repo = RepoConfig {
        clone_url: url.clone(),
        ..RepoConfig::default()
    };
    let workspace = GitWorkspace::new(&root, &repo, Duration::from_secs(60));

    workspace.ensure_cloned().await.unwrap();
    assert!(root.join("README.md").exists());
    // Second call reuses the clone
    workspace.ensure_cloned().await.unwrap();

    let branch = workspace
        .create_or_checkout_branch("PROJ-1", "Add CSV export!")
        .await
        .unwrap();
    assert_eq!(branch, "feature/PROJ-1-add-csv-export");
    assert!(!workspace.has_uncommitted_changes().await);

    std::fs::write(root.join("export.txt"), "csv").unwrap();
    assert!(workspace.has_uncommitted_changes().await);

    workspace
        .commit_and_push(&branch, "PROJ-1: Add CSV export!\n\nImplemented via factory")
        .await
        .unwrap();
    assert!(!workspace.has_uncommitted_changes().await);

    let remote_branches = git(Path::new(&url), &["branch", "--list"]);
    assert!(remote_branches.contains("feature/PROJ-1-add-csv-export"));

    let author = git(&root, &["log", "-1", "--format=%an <%ae>"]);
    assert_eq!(author.trim(), "Jira Automation <automation@jira-automation>");

    // Existing branch is reused, not recreated
    let again = workspace
        .create_or_checkout_branch("PROJ-1", "Add CSV export!")
        .await
        .unwrap();
    assert_eq!(again, branch);
    assert!(root.join("export.txt").exists());
}

#[tokio::test]
async fn test_clone_failure_is_reported() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let repo = RepoConfig {
        clone_url: temp.path().join("missing.git").to_string_lossy().to_string(),
        ..RepoConfig::default()
    };
    let workspace = GitWorkspace::new(temp.path().join("work"), &repo, Duration::from_secs(60));

    assert!(workspace.ensure_cloned().await.is_err());
}
