//! Change notification for the resource file

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{MenuError, MenuResult};

/// Watches the directory holding the resource file and raises a flag when
/// the file is touched. Editors often replace files, so the parent
/// directory is watched rather than the file itself.
pub struct ConfigWatcher {
    path: PathBuf,
    changed: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> MenuResult<Self> {
        let changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&changed);
        let file_name = path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let hit = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if hit {
                        flag.store(true, Ordering::SeqCst);
                    }
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| MenuError::Io(std::io::Error::other(e.to_string())))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| MenuError::Io(std::io::Error::other(e.to_string())))?;

        tracing::debug!(path = %path.display(), "watching config");
        Ok(Self {
            path: path.to_path_buf(),
            changed,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file changed since the last call
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::SeqCst)
    }
}
