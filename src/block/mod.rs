//! Content blocks: text plus style, laid out into a sized visual.
//!
//! [`ContentBlock`] is the seam the layout tree consumes. The tree only
//! needs three things from a block: its height at a given width, its text,
//! and a stream of link activations. [`MarkdownBlock`] is the comrak-backed
//! implementation used by the demo.

mod markdown;
mod types;

use std::fmt;

pub use markdown::MarkdownBlock;
pub use types::{InlineSpan, InlineStyle, LineType, VisualLine};

use crate::style::StyleConfig;

/// Callback invoked with the reference of each activated link.
pub type ActivationListener = Box<dyn FnMut(&str)>;

/// Handle returned by [`ContentBlock::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A rendered unit of text whose height depends on its width.
pub trait ContentBlock: fmt::Debug {
    fn text(&self) -> &str;

    fn style(&self) -> &StyleConfig;

    /// Lay out at `width` pixels and return the resulting intrinsic height.
    fn layout(&mut self, width: u32) -> u32;

    /// Replace the text, re-lay out at the current width, return the new height.
    fn set_text(&mut self, text: String) -> u32;

    fn intrinsic_height(&self) -> u32;

    fn lines(&self) -> &[VisualLine];

    /// Link reference under a block-local point.
    fn link_at(&self, x: u32, y: u32) -> Option<&str>;

    fn subscribe(&mut self, listener: ActivationListener) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Deliver one activation of `reference` to every subscriber, in
    /// subscription order.
    fn activate(&mut self, reference: &str);
}

/// Subscriber list for activation events.
#[derive(Default)]
pub struct Activations {
    next_id: u64,
    listeners: Vec<(SubscriptionId, ActivationListener)>,
}

impl fmt::Debug for Activations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activations")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Activations {
    pub fn subscribe(&mut self, listener: ActivationListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, reference: &str) {
        for (_, listener) in &mut self.listeners {
            listener(reference);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_activations_deliver_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut activations = Activations::default();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            activations.subscribe(Box::new(move |reference| {
                seen.borrow_mut().push(format!("{tag}:{reference}"));
            }));
        }
        activations.emit("x");
        activations.emit("");
        assert_eq!(*seen.borrow(), vec!["a:x", "b:x", "a:", "b:"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut activations = Activations::default();
        let counter = Rc::clone(&count);
        let id = activations.subscribe(Box::new(move |_| *counter.borrow_mut() += 1));
        activations.emit("one");
        assert!(activations.unsubscribe(id));
        assert!(!activations.unsubscribe(id));
        activations.emit("two");
        assert_eq!(*count.borrow(), 1);
        assert!(activations.is_empty());
    }
}
