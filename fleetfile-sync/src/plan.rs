//! Dry-run planning for `fleetfile diff`.
//!
//! Renders every cluster in memory and compares against the base directory.
//! Nothing is written or deleted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use fleetfile_core::{AppCluster, AppId};

use crate::error::{io_err, PublishError};
use crate::publisher::collect_files;
use crate::render::{artifact_path, render};

/// What a sync would do to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    Create,
    Refresh { unified_diff: String },
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub app_id: AppId,
    pub path: PathBuf,
    pub change: PlannedChange,
}

/// Everything a sync of the same cluster set would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub artifacts: Vec<PlannedArtifact>,
    /// Files a sync would delete.
    pub superfluous: Vec<PathBuf>,
}

impl SyncPlan {
    /// A sync would leave the directory exactly as it is.
    pub fn is_noop(&self) -> bool {
        self.superfluous.is_empty()
            && self
                .artifacts
                .iter()
                .all(|a| a.change == PlannedChange::Keep)
    }
}

/// Compute what [`FilesPublisher::sync`](crate::FilesPublisher::sync) would do.
pub fn plan(base: &Path, apps: &[AppCluster]) -> Result<SyncPlan, PublishError> {
    let mut artifacts = Vec::with_capacity(apps.len());
    for app in apps {
        let path = artifact_path(base, &app.id);
        let rendered = render(app);
        let change = match std::fs::read(&path) {
            Err(e) if e.kind() == ErrorKind::NotFound => PlannedChange::Create,
            Err(e) => return Err(io_err(&path, e)),
            Ok(existing) if existing == rendered.as_bytes() => PlannedChange::Keep,
            Ok(existing) => PlannedChange::Refresh {
                unified_diff: unified_diff(&path, &String::from_utf8_lossy(&existing), &rendered),
            },
        };
        artifacts.push(PlannedArtifact {
            app_id: app.id.clone(),
            path,
            change,
        });
    }

    let superfluous = match std::fs::metadata(base) {
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        _ => {
            let mut old = collect_files(base)?;
            for artifact in &artifacts {
                old.remove(&artifact.path);
            }
            old.into_iter().collect()
        }
    };

    Ok(SyncPlan {
        artifacts,
        superfluous,
    })
}

fn unified_diff(path: &Path, existing: &str, rendered: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let old_header = format!("a/{name}");
    let new_header = format!("b/{name}");
    TextDiff::from_lines(existing, rendered)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}
