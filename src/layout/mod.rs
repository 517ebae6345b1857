//! Content-sized vertical layout.
//!
//! Every node in a [`LayoutTree`] owns its own intrinsic height. Widths are
//! handed down by parents; heights are only ever derived from children and
//! pushed upward one level at a time:
//!
//! - [`LayoutTree::add_child`]: attach a node and settle its new ancestors
//! - [`LayoutTree::set_width`]: re-wrap a subtree at a new width
//! - [`LayoutTree::replace_text`]: swap a block's text and re-measure
//!
//! Each of these returns the ordered list of [`SizeChange`]s it produced,
//! leaf first, root last.

mod error;
mod tree;

pub use error::LayoutError;
pub use tree::{
    Hit, Label, LabelRole, LayoutTree, NodeId, NodeKind, ObserverId, Padding, Placement,
    SizeChange, StackStyle,
};
