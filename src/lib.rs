// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. layout::LayoutTree)
    clippy::module_name_repetitions
)]

//! # stackview
//!
//! Reactive, content-sized markdown blocks stacked into a scrollable
//! document, shown in the terminal.
//!
//! Every block reports the height its text needs at the width it was
//! given. Heights propagate bottom-up through nested vertical stacks, so
//! changing one block's text resizes its cell, its section and the
//! document root in one synchronous pass, and the viewport's scroll range
//! follows.
//!
//! ## Architecture
//!
//! The library core is toolkit-agnostic; the terminal host uses The Elm
//! Architecture (TEA):
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: State transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`layout`]: Size-propagating tree of stacks, labels and blocks
//! - [`block`]: Content blocks and the comrak-backed markdown block
//! - [`style`]: Immutable block style configuration
//! - [`document`]: Sections and variation cells built from a catalog
//! - [`source`]: Document loading with a fallback
//! - [`viewport`]: Vertical scroll window over the document
//! - [`router`]: Link activation routing
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching

pub mod app;
pub mod block;
pub mod config;
pub mod document;
pub mod layout;
pub mod perf;
pub mod router;
pub mod source;
pub mod style;
pub mod ui;
pub mod viewport;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::block::{ContentBlock, MarkdownBlock};
    pub use crate::document::{DemoSpec, DocumentRoot, Metrics, demo_catalog};
    pub use crate::layout::{LayoutError, LayoutTree, NodeId, SizeChange};
    pub use crate::router::{LinkEventRouter, LinkHandler, LinkPrinter};
    pub use crate::viewport::ScrollViewport;
}
