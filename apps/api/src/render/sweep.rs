//! Periodic removal of render artifacts nobody collected.
//!
//! PDFs are deleted right after they are sent, so anything older than the
//! retention window was orphaned by a crash or an aborted request.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::render::renderer::JOB_PREFIX;

/// Deletes job files in `work_dir` whose modification time is older than `max_age`.
/// Returns how many files were removed. Files not created by the renderer are left alone.
pub async fn sweep_stale_outputs(work_dir: &Path, max_age: Duration) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(work_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_job_file(&path) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Swept stale render artifact {}", path.display());
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to sweep {}: {e}", path.display()),
        }
    }
    Ok(removed)
}

/// Runs `sweep_stale_outputs` every `interval` for the life of the process.
pub fn spawn_sweeper(work_dir: PathBuf, interval: Duration, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match sweep_stale_outputs(&work_dir, max_age).await {
                Ok(0) => {}
                Ok(n) => info!("Swept {n} stale render artifacts from {}", work_dir.display()),
                Err(e) => warn!("Render sweep of {} failed: {e}", work_dir.display()),
            }
        }
    })
}

fn is_job_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(JOB_PREFIX))
}
