// Preferences module - notices edits to the light/dark theme preferences
//
// The editor writes its settings file whenever anything changes, including
// our own writes to the color theme key. The watcher reports every touch of
// the file; PreferenceTracker then filters down to real changes of the
// light/dark preferences so that only those trigger a resync.

use crate::sync::ThemePreferences;
use anyhow::{Context, Result};
use notify::{recommended_watcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use tokio::sync::mpsc;

/// File-system watch on the editor settings file
///
/// Watches the parent directory rather than the file itself: editors (and
/// JsonSettingsStore) replace the file by rename, which would orphan a watch
/// on the old inode.
pub struct PreferenceWatcher {
    // Dropping the watcher stops the watch
    _watcher: RecommendedWatcher,
    changes: mpsc::UnboundedReceiver<()>,
}

impl PreferenceWatcher {
    pub fn start(settings_path: &Path) -> Result<Self> {
        let dir = settings_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name: OsString = settings_path
            .file_name()
            .context("Settings path has no file name")?
            .to_os_string();

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let touches_settings = event
                        .paths
                        .iter()
                        .any(|path| path.file_name() == Some(file_name.as_os_str()));

                    let is_relevant_event = matches!(
                        event.kind,
                        notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                    );

                    if touches_settings && is_relevant_event {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    tracing::warn!(watcher = "preferences", "File watcher error: {}", e);
                }
            }
        })
        .context("Failed to create settings watcher")?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::info!(path = %settings_path.display(), "Watching theme preferences");

        Ok(Self {
            _watcher: watcher,
            changes: rx,
        })
    }

    /// Wait for the next touch of the settings file
    ///
    /// Bursts of events collapse into one wakeup.
    pub async fn changed(&mut self) -> Option<()> {
        self.changes.recv().await?;
        while self.changes.try_recv().is_ok() {}
        Some(())
    }
}

/// Remembers the last seen preferences and reports when they differ
#[derive(Debug, Default)]
pub struct PreferenceTracker {
    last: ThemePreferences,
}

impl PreferenceTracker {
    pub fn new(initial: ThemePreferences) -> Self {
        Self { last: initial }
    }

    /// Record `current`; true if either preference changed since last time
    pub fn observe(&mut self, current: ThemePreferences) -> bool {
        if current == self.last {
            return false;
        }
        self.last = current;
        true
    }
}
