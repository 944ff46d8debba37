//! In-memory collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use factory::codehost::CodeHost;
use factory::error::{CollaboratorError, CollaboratorResult};
use factory::orchestrator::Implementer;
use factory::tracker::Tracker;
use factory::workspace::{branch_name, Workspace};
use factory::{Item, Pipeline, PipelineSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PR_URL: &str = "https://github.com/acme/widgets/pull/42";

pub fn item(key: &str, item_type: &str, status: &str) -> Item {
    Item {
        title: format!("Work for {}", key),
        item_type: item_type.to_string(),
        status: status.to_string(),
        priority: "Medium".to_string(),
        ..Item::new(key).with_description("Do it.\n\nAcceptance criteria: it works")
    }
}

fn failed(what: &str) -> CollaboratorError {
    CollaboratorError::CommandFailed {
        program: "fake".to_string(),
        detail: format!("{} failed", what),
    }
}

#[derive(Default)]
pub struct FakeTracker {
    pub items: Mutex<HashMap<String, Item>>,
    /// Keys returned by `fetch_assigned`, in order
    pub assigned: Mutex<Vec<String>>,
    pub fail_assigned: bool,
    pub fail_comment: bool,
    pub calls: Mutex<Vec<String>>,
    /// When each `fetch_assigned` call happened
    pub assigned_at: Mutex<Vec<tokio::time::Instant>>,
}

impl FakeTracker {
    pub fn with_items(items: Vec<Item>) -> Self {
        let tracker = Self::default();
        tracker.add(items);
        tracker
    }

    pub fn add(&self, items: Vec<Item>) {
        let mut map = self.items.lock().unwrap();
        for item in items {
            map.insert(item.key.clone(), item);
        }
    }

    pub fn assign(&self, keys: &[&str]) {
        *self.assigned.lock().unwrap() = keys.iter().map(|k| k.to_string()).collect();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Keys passed to `fetch_item`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("fetch ").map(str::to_string))
            .collect()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Tracker for FakeTracker {
    async fn fetch_item(&self, key: &str) -> CollaboratorResult<Item> {
        self.log(format!("fetch {}", key));
        self.items
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("issue {}", key)))
    }

    async fn fetch_assigned(&self) -> CollaboratorResult<Vec<Item>> {
        self.log("assigned".to_string());
        self.assigned_at
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        if self.fail_assigned {
            return Err(failed("search"));
        }
        Ok(self
            .assigned
            .lock()
            .unwrap()
            .iter()
            .map(|key| Item::new(key.as_str()))
            .collect())
    }

    async fn add_comment(&self, key: &str, text: &str) -> CollaboratorResult<()> {
        self.log(format!("comment {} {}", key, text));
        if self.fail_comment {
            return Err(failed("comment"));
        }
        Ok(())
    }

    async fn transition(&self, key: &str, target: &str) -> CollaboratorResult<()> {
        self.log(format!("transition {} {}", key, target));
        Ok(())
    }
}

pub struct FakeWorkspace {
    pub root: PathBuf,
    /// What `has_uncommitted_changes` reports
    pub dirty: AtomicBool,
    pub fail_push: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dirty: AtomicBool::new(true),
            fail_push: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn clean(self) -> Self {
        self.dirty.store(false, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Workspace for FakeWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_cloned(&self) -> CollaboratorResult<()> {
        self.log("clone".to_string());
        Ok(())
    }

    async fn create_or_checkout_branch(&self, key: &str, title: &str) -> CollaboratorResult<String> {
        let branch = branch_name(key, title);
        self.log(format!("branch {}", branch));
        Ok(branch)
    }

    async fn has_uncommitted_changes(&self) -> bool {
        self.log("status".to_string());
        self.dirty.load(Ordering::SeqCst)
    }

    async fn commit_and_push(&self, branch: &str, message: &str) -> CollaboratorResult<()> {
        self.log(format!("push {} {}", branch, message));
        if self.fail_push {
            return Err(failed("push"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeImplementer {
    pub fail: bool,
    /// How long each run takes
    pub delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl FakeImplementer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Implementer for FakeImplementer {
    async fn run(
        &self,
        _workspace_root: &Path,
        item: &Item,
        _timeout: Duration,
    ) -> CollaboratorResult<()> {
        self.calls.lock().unwrap().push(item.key.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(failed("claude"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCodeHost {
    pub fail: bool,
    /// (title, source, target) per call
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeCodeHost {
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeHost for FakeCodeHost {
    async fn open_change_request(
        &self,
        title: &str,
        _body: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> CollaboratorResult<String> {
        self.calls.lock().unwrap().push((
            title.to_string(),
            source_branch.to_string(),
            target_branch.to_string(),
        ));
        if self.fail {
            return Err(CollaboratorError::Http {
                status: 422,
                body: "Validation Failed".to_string(),
            });
        }
        Ok(PR_URL.to_string())
    }
}

/// Fakes wired into a pipeline
pub struct Harness {
    pub tracker: Arc<FakeTracker>,
    pub workspace: Arc<FakeWorkspace>,
    pub implementer: Arc<FakeImplementer>,
    pub code_host: Arc<FakeCodeHost>,
}

impl Harness {
    pub fn new(tracker: FakeTracker, workspace: FakeWorkspace) -> Self {
        Self {
            tracker: Arc::new(tracker),
            workspace: Arc::new(workspace),
            implementer: Arc::new(FakeImplementer::default()),
            code_host: Arc::new(FakeCodeHost::default()),
        }
    }

    pub fn settings() -> PipelineSettings {
        PipelineSettings {
            tracker_url: "https://acme.atlassian.net".to_string(),
            ..PipelineSettings::default()
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.tracker.clone(),
            self.workspace.clone(),
            self.implementer.clone(),
            self.code_host.clone(),
            Self::settings(),
        )
    }
}
