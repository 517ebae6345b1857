use std::path::{Path, PathBuf};

use crate::layout::{LayoutError, SizeChange};
use crate::router::{LinkEventRouter, LinkLog, LinkPrinter};
use crate::source::{DirSource, load_or_fallback};
use crate::viewport::{Activation, ScrollViewport};

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    pub viewport: ScrollViewport,
    /// Routes every block's link activations into [`Self::link_log`].
    pub router: LinkEventRouter,
    pub link_log: LinkLog,
    /// Canonical document shown by the full-document cell.
    pub document_path: PathBuf,
    /// Terminal size in cells, status bar included.
    pub terminal_size: (u16, u16),
    /// Whether the viewport tracks the terminal size on resize.
    pub follow_terminal: bool,
    pub watch_enabled: bool,
    pub help_visible: bool,
    pub should_quit: bool,
    pub last_activation: Option<Activation>,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
}

impl Model {
    /// Wrap `viewport`, printing every link activation into a [`LinkLog`].
    ///
    /// # Errors
    /// Propagates [`LayoutError`] if a listed content block cannot be
    /// subscribed to.
    pub fn new(
        mut viewport: ScrollViewport,
        document_path: PathBuf,
        terminal_size: (u16, u16),
    ) -> Result<Self, LayoutError> {
        let link_log = LinkLog::new();
        let router = LinkEventRouter::new(LinkPrinter::new(link_log.clone()));
        let blocks = viewport.document().content_blocks();
        let attached = router.attach_all(viewport.tree_mut(), blocks)?;
        tracing::debug!(blocks = attached.len(), "link router attached");

        Ok(Self {
            viewport,
            router,
            link_log,
            document_path,
            terminal_size,
            follow_terminal: true,
            watch_enabled: false,
            help_visible: false,
            should_quit: false,
            last_activation: None,
            config_global_path: None,
            config_local_path: None,
        })
    }

    /// Read the canonical document from disk, falling back to the
    /// placeholder text when it cannot be read.
    pub fn read_document(&self) -> String {
        let root = self
            .document_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = self
            .document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        load_or_fallback(&DirSource::new(root), &name)
    }

    /// Replace the text of the full-document cell, if the document has one.
    ///
    /// The new height propagates to the root and the scroll offset is
    /// clamped to the new range.
    ///
    /// # Errors
    /// [`LayoutError::NotABlock`] if the full-document cell is not a block.
    pub fn reload_full_document(&mut self, text: String) -> Result<Vec<SizeChange>, LayoutError> {
        let Some(node) = self.viewport.document().full_document_block() else {
            return Ok(Vec::new());
        };
        let _scope = crate::perf::scope("app.reload_full_document");
        let changes = self.viewport.replace_text(node, text)?;
        crate::perf::log_event(
            "app.reload",
            format!(
                "changes={} content_height={} offset={}",
                changes.len(),
                self.viewport.content_height(),
                self.viewport.offset()
            ),
        );
        Ok(changes)
    }
}
