//! Watch mode
//!
//! Re-runs validation whenever the schema or data file changes. Each pass
//! compiles a fresh engine and starts from an empty identifier index.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::runner::{self, RunReport};

/// Events coming from the file watcher
#[derive(Debug)]
enum WatchEvent {
    SourceChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Pause after a change so that editors writing in several steps trigger a
/// single pass
const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Validate once, then again after every change to the watched files.
///
/// `on_pass` receives every pass, successful or not. Returns only when the
/// watcher stops.
pub async fn watch<F>(config: &Config, mut on_pass: F) -> Result<()>
where
    F: FnMut(Result<RunReport>),
{
    let (schema_path, data_path) = config.require_paths()?;
    let targets = vec![canonical(schema_path)?, canonical(data_path)?];

    let (tx, mut rx) = mpsc::unbounded_channel();
    let watched = targets.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                    event.kind
                {
                    for path in event.paths {
                        if is_watched(&path, &watched) {
                            let _ = tx.send(WatchEvent::SourceChanged(path));
                        }
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatchEvent::WatcherError(e));
            }
        },
        NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    // Watch directories so files replaced by rename keep being seen
    let mut dirs: Vec<&Path> = targets.iter().filter_map(|p| p.parent()).collect();
    dirs.dedup();
    for dir in dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching {}", dir.display());
    }

    on_pass(runner::run_from_config(config));

    while let Some(event) = rx.recv().await {
        match event {
            WatchEvent::SourceChanged(path) => {
                log::info!("Source changed: {}", path.display());
                tokio::time::sleep(SETTLE_DELAY).await;
                // Fold the burst into this pass
                while rx.try_recv().is_ok() {}
                on_pass(runner::run_from_config(config));
            }
            WatchEvent::WatcherError(e) => {
                log::error!("File watcher error: {}", e);
            }
        }
    }

    Ok(())
}

/// Whether a watcher event path refers to one of the target files
pub fn is_watched(path: &Path, targets: &[PathBuf]) -> bool {
    // Event paths may not be canonical; fall back to comparing file names
    // within the same directory
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    targets.iter().any(|target| {
        if resolved == *target {
            return true;
        }
        match (path.file_name(), target.file_name()) {
            (Some(name), Some(target_name)) if name == target_name => {
                let dir = path
                    .parent()
                    .and_then(|d| d.canonicalize().ok());
                dir.as_deref() == target.parent()
            }
            _ => false,
        }
    })
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Cannot watch missing file: {}", path.display()))
}
