//! File publisher: one `<id>.instances` artifact per cluster under a base
//! directory, reconciled against the desired set on every full sync.
//!
//! ## `sync` — reconciliation pass
//!
//! 1. Ensure the base directory exists (mode `0770` on each directory created).
//! 2. Snapshot the files already there.
//! 3. Publish every desired cluster; a failure is recorded, not fatal.
//! 4. Delete snapshot files that no desired cluster maps to.
//!
//! Steps 1 and 2 are fatal: without a trustworthy listing nothing is deleted.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Level;

use fleetfile_core::{
    AppBackend, AppCluster, AppId, EventListener, LogSink, PublisherConfig, RemovedFrom,
    TracingSink,
};

use crate::error::{io_err, PublishError};
use crate::render::{artifact_path, render, tmp_path};
use crate::writer::{self, set_dir_permissions, WriteResult};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A single artifact that could not be written or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFailure {
    /// Cluster being published; `None` for superfluous-file cleanup.
    pub app_id: Option<AppId>,
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one [`FilesPublisher::sync`] pass.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub started_at: DateTime<Utc>,
    pub writes: Vec<WriteResult>,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<ArtifactFailure>,
}

impl ApplyReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            writes: Vec::new(),
            removed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn created(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Created { .. }))
    }

    pub fn refreshed(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Refreshed { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    /// No artifact failed to publish or to be cleaned up.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }
}

// ---------------------------------------------------------------------------
// FilesPublisher
// ---------------------------------------------------------------------------

/// Publishes each cluster's backends to `<base_path>/<id>.instances`.
///
/// Sole writer of its base directory: any file there that does not belong
/// to a desired cluster is removed on the next [`sync`](Self::sync).
pub struct FilesPublisher {
    base_path: PathBuf,
    verbose: bool,
    sink: Arc<dyn LogSink>,
}

impl FilesPublisher {
    pub fn new(config: &PublisherConfig) -> Self {
        Self::with_sink(config, TracingSink::shared())
    }

    pub fn with_sink(config: &PublisherConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            base_path: config.base_path.clone(),
            verbose: config.verbose,
            sink,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Converge the base directory to exactly `apps`.
    ///
    /// Returns `Err` only when the pass was aborted before touching any
    /// artifact; per-artifact failures are in [`ApplyReport::failures`].
    pub fn sync(&self, apps: &[AppCluster]) -> Result<ApplyReport, PublishError> {
        let mut report = ApplyReport::new(Utc::now());

        self.ensure_base_dir()?;
        let old_files = collect_files(&self.base_path)?;

        let mut keep = BTreeSet::new();
        for app in apps {
            // Only meaningful for valid ids; an invalid one is reported below.
            let target = artifact_path(&self.base_path, &app.id);
            match self.write_app(app) {
                Ok(result) => report.writes.push(result),
                Err(e) => {
                    self.error(&format!("failed to publish {}: {e}", app.id));
                    report.failures.push(ArtifactFailure {
                        app_id: Some(app.id.clone()),
                        path: target.clone(),
                        error: e.to_string(),
                    });
                }
            }
            // Kept even on failure: the previous artifact stays in place.
            keep.insert(target);
        }

        for superfluous in old_files.difference(&keep) {
            self.info(&format!(
                "removing superfluous file: {}",
                superfluous.display()
            ));
            match std::fs::remove_file(superfluous) {
                Ok(()) => report.removed.push(superfluous.clone()),
                // A leftover tmp file consumed by this very pass.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    self.error(&format!(
                        "failed to remove {}: {e}",
                        superfluous.display()
                    ));
                    report.failures.push(ArtifactFailure {
                        app_id: None,
                        path: superfluous.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Render and publish the artifact for a single cluster.
    pub fn write_app(&self, app: &AppCluster) -> Result<WriteResult, PublishError> {
        let target = self.artifact_path(&app.id)?;
        let result = writer::publish(&target, &render(app))?;
        match &result {
            WriteResult::Created { path } => self.info(&format!("new {}", path.display())),
            WriteResult::Refreshed { path } => self.info(&format!("refresh {}", path.display())),
            WriteResult::Unchanged { .. } => {}
        }
        Ok(result)
    }

    /// Delete the artifact of a torn-down cluster, plus any staged tmp file.
    ///
    /// Returns whether an artifact existed.
    pub fn remove_app(&self, id: &AppId) -> Result<bool, PublishError> {
        let target = self.artifact_path(id)?;
        let removed = remove_if_exists(&target)?;
        remove_if_exists(&tmp_path(&target))?;
        if removed {
            self.info(&format!("removed {}", target.display()));
        }
        Ok(removed)
    }

    /// Artifact path for `id`, refusing ids that would leave the base directory.
    fn artifact_path(&self, id: &AppId) -> Result<PathBuf, PublishError> {
        if !id.is_valid_stem() {
            return Err(PublishError::InvalidId(id.clone()));
        }
        Ok(artifact_path(&self.base_path, id))
    }

    /// Create the base directory and any missing parents, each with mode `0770`.
    fn ensure_base_dir(&self) -> Result<(), PublishError> {
        let create_err = |source| PublishError::CreateDir {
            path: self.base_path.clone(),
            source,
        };
        let missing: Vec<&Path> = self
            .base_path
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .collect();
        std::fs::create_dir_all(&self.base_path).map_err(create_err)?;
        for dir in missing.into_iter().rev() {
            set_dir_permissions(dir).map_err(create_err)?;
        }
        Ok(())
    }

    fn info(&self, message: &str) {
        if self.verbose {
            self.sink.log(Level::INFO, message);
        }
    }

    fn error(&self, message: &str) {
        self.sink.log(Level::ERROR, message);
    }
}

impl EventListener for FilesPublisher {
    fn startup(&mut self) {
        match self.ensure_base_dir() {
            Ok(()) => self.info(&format!("publishing to {}", self.base_path.display())),
            Err(e) => self.error(&e.to_string()),
        }
    }

    fn shutdown(&mut self) {
        self.info("shutdown");
    }

    fn apply(&mut self, apps: &[AppCluster]) {
        match self.sync(apps) {
            Ok(report) => self.info(&format!(
                "synced {} clusters: {} new, {} refreshed, {} unchanged, {} removed, {} failed",
                apps.len(),
                report.created(),
                report.refreshed(),
                report.unchanged(),
                report.removed.len(),
                report.failures.len(),
            )),
            Err(e) => self.error(&format!("sync aborted: {e}")),
        }
    }

    fn add_task(&mut self, _task: &AppBackend, app: &AppCluster) {
        if let Err(e) = self.write_app(app) {
            self.error(&format!("failed to publish {}: {e}", app.id));
        }
    }

    fn remove_task(&mut self, _task: &AppBackend, from: RemovedFrom<'_>) {
        let outcome = match from {
            RemovedFrom::Cluster(app) => self.write_app(app).map(|_| ()),
            RemovedFrom::Retired(id) => self.remove_app(id).map(|_| ()),
        };
        if let Err(e) = outcome {
            self.error(&format!("failed to update {}: {e}", from.app_id()));
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Every non-directory entry directly under `base`.
///
/// Any error, including one on a single entry, fails the whole listing.
pub(crate) fn collect_files(base: &Path) -> Result<BTreeSet<PathBuf>, PublishError> {
    let list_err = |source| PublishError::ListDir {
        path: base.to_path_buf(),
        source,
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(base).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if entry.file_type().map_err(list_err)?.is_dir() {
            continue;
        }
        files.insert(entry.path());
    }
    Ok(files)
}

fn remove_if_exists(path: &Path) -> Result<bool, PublishError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
