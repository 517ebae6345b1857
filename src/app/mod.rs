//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions
//! - [`App::run`]: Main event loop with rendering

mod event_loop;
mod input;
mod model;
mod update;

pub use model::Model;
pub use update::{Message, update};

use std::path::{Path, PathBuf};

use crate::source::CANONICAL_DOCUMENT;

/// Main application struct that owns the terminal and runs the event loop.
#[derive(Debug)]
pub struct App {
    document_path: PathBuf,
    watch_enabled: bool,
    size: Option<(u32, u32)>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application showing `document_path` in its
    /// full-document cell.
    pub fn new(document_path: PathBuf) -> Self {
        Self {
            document_path,
            watch_enabled: false,
            size: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Fix the viewport to `size` pixels instead of following the terminal.
    #[must_use]
    pub const fn with_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.size = size;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(mut self, global: PathBuf, local: Option<PathBuf>) -> Self {
        self.config_global_path = Some(global);
        self.config_local_path = local;
        self
    }

    fn document_name(&self) -> String {
        self.document_path
            .file_name()
            .map_or_else(|| CANONICAL_DOCUMENT.to_string(), |n| n.to_string_lossy().into_owned())
    }

    fn document_dir(&self) -> PathBuf {
        self.document_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests;
