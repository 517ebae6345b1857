//! Live reload of the canonical document.
//!
//! The parent directory is watched rather than the file, since editors
//! often save by renaming a temporary file over the original.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounced change notifications for one document file.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    path: PathBuf,
    name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl std::fmt::Debug for DocumentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWatcher")
            .field("path", &self.path)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl DocumentWatcher {
    /// Watch `path`, reporting a change once events have been quiet for
    /// `debounce`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // OS events carry canonical paths.
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let name = path.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = parent_dir(&path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            rx,
            dir,
            path,
            name,
            debounce,
            pending_since: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events; true once a debounced change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(event) if self.is_relevant(&event) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::warn!(error = %err, "document watcher error");
                    crate::perf::log_event("watcher.error", err.to_string());
                }
            }
        }

        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} path={}",
                    self.path.display()
                ),
            );
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|changed| {
            changed == &self.dir
                || changed == &self.path
                || self
                    .name
                    .as_ref()
                    .is_some_and(|name| changed.file_name() == Some(name.as_os_str()))
        })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
