//! Link activation routing.
//!
//! A [`LinkEventRouter`] subscribes to the activation stream of any number
//! of content blocks and forwards every activation, unchanged and in
//! emission order, to one [`LinkHandler`]. Handler errors stop at the
//! router: they are logged and counted, and later activations are still
//! delivered.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use anyhow::Context;

use crate::block::SubscriptionId;
use crate::layout::{LayoutError, LayoutTree, NodeId};

/// Receives `(source, reference)` for each activated link.
///
/// Return an error rather than panicking: the router does not catch
/// panics, so one unwinds through the block that raised the activation.
pub trait LinkHandler {
    /// # Errors
    /// Any error is logged by the router and otherwise ignored.
    fn on_link(&mut self, source: NodeId, reference: &str) -> anyhow::Result<()>;
}

impl<F> LinkHandler for F
where
    F: FnMut(NodeId, &str) -> anyhow::Result<()>,
{
    fn on_link(&mut self, source: NodeId, reference: &str) -> anyhow::Result<()> {
        self(source, reference)
    }
}

/// Production handler: one `Link clicked: {reference}` line per activation.
#[derive(Debug)]
pub struct LinkPrinter<W: Write> {
    out: W,
}

impl<W: Write> LinkPrinter<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LinkHandler for LinkPrinter<W> {
    fn on_link(&mut self, _source: NodeId, reference: &str) -> anyhow::Result<()> {
        writeln!(self.out, "Link clicked: {reference}").context("Failed to write link activation")?;
        self.out.flush().context("Failed to flush link output")
    }
}

/// Shared in-memory sink, so printed links can be shown while the terminal
/// is in raw mode and replayed to stdout afterwards.
#[derive(Debug, Clone, Default)]
pub struct LinkLog(Rc<RefCell<Vec<u8>>>);

impl LinkLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn last_line(&self) -> Option<String> {
        self.contents().lines().last().map(ToOwned::to_owned)
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl Write for LinkLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Shared {
    handler: RefCell<Box<dyn LinkHandler>>,
    /// Activations raised while the handler was running.
    pending: RefCell<VecDeque<(NodeId, String)>>,
    delivered: Cell<u64>,
    failures: Cell<u64>,
}

/// Cheap-to-clone handle; every clone feeds the same handler.
#[derive(Clone)]
pub struct LinkEventRouter {
    shared: Rc<Shared>,
}

impl fmt::Debug for LinkEventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkEventRouter")
            .field("delivered", &self.shared.delivered.get())
            .field("failures", &self.shared.failures.get())
            .finish_non_exhaustive()
    }
}

impl LinkEventRouter {
    pub fn new(handler: impl LinkHandler + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                handler: RefCell::new(Box::new(handler)),
                pending: RefCell::new(VecDeque::new()),
                delivered: Cell::new(0),
                failures: Cell::new(0),
            }),
        }
    }

    /// Subscribe to the activations of one content block.
    ///
    /// # Errors
    /// [`LayoutError::NotABlock`] if `block` is not a content block.
    pub fn attach(
        &self,
        tree: &mut LayoutTree,
        block: NodeId,
    ) -> Result<SubscriptionId, LayoutError> {
        let content = tree
            .block_of_mut(block)
            .ok_or(LayoutError::NotABlock(block))?;
        let router = self.clone();
        Ok(content.subscribe(Box::new(move |reference| router.dispatch(block, reference))))
    }

    /// Attach to every block in `blocks`, in order.
    ///
    /// # Errors
    /// Stops at the first node that is not a content block.
    pub fn attach_all(
        &self,
        tree: &mut LayoutTree,
        blocks: impl IntoIterator<Item = NodeId>,
    ) -> Result<Vec<(NodeId, SubscriptionId)>, LayoutError> {
        blocks
            .into_iter()
            .map(|block| Ok((block, self.attach(tree, block)?)))
            .collect()
    }

    pub fn detach(&self, tree: &mut LayoutTree, block: NodeId, id: SubscriptionId) -> bool {
        tree.block_of_mut(block)
            .is_some_and(|content| content.unsubscribe(id))
    }

    /// Hand one activation to the handler.
    ///
    /// An activation raised from inside the handler is queued and delivered
    /// once the running call returns, so every activation reaches the
    /// handler exactly once and in emission order.
    pub fn dispatch(&self, source: NodeId, reference: &str) {
        let Ok(mut handler) = self.shared.handler.try_borrow_mut() else {
            tracing::debug!(%source, reference, "queueing link activation raised from inside the handler");
            self.shared
                .pending
                .borrow_mut()
                .push_back((source, reference.to_string()));
            return;
        };

        self.deliver(&mut **handler, source, reference);
        loop {
            let next = self.shared.pending.borrow_mut().pop_front();
            let Some((source, reference)) = next else {
                break;
            };
            self.deliver(&mut **handler, source, &reference);
        }
    }

    fn deliver(&self, handler: &mut dyn LinkHandler, source: NodeId, reference: &str) {
        self.shared.delivered.set(self.shared.delivered.get() + 1);
        crate::perf::log_event("router.dispatch", format!("source={source} reference={reference:?}"));

        if let Err(err) = handler.on_link(source, reference) {
            self.shared.failures.set(self.shared.failures.get() + 1);
            tracing::error!(%source, reference, error = format!("{err:#}"), "link handler failed");
        }
    }

    /// Activations handed to the handler so far.
    pub fn delivered(&self) -> u64 {
        self.shared.delivered.get()
    }

    /// Handler calls that returned an error.
    pub fn failures(&self) -> u64 {
        self.shared.failures.get()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::block::testing::FixedBlock;
    use crate::layout::{Padding, StackStyle};

    fn two_blocks() -> (LayoutTree, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.stack(StackStyle::new(0, Padding::default()));
        let first = tree.block(FixedBlock::boxed(10));
        let second = tree.block(FixedBlock::boxed(10));
        tree.add_child(root, first).unwrap();
        tree.add_child(root, second).unwrap();
        (tree, first, second)
    }

    fn activate(tree: &mut LayoutTree, block: NodeId, reference: &str) {
        tree.block_of_mut(block).unwrap().activate(reference);
    }

    #[test]
    fn test_printer_formats_reference() {
        let mut printer = LinkPrinter::new(Vec::new());
        let (_, block, _) = two_blocks();
        printer.on_link(block, "https://example.com").unwrap();
        printer.on_link(block, "").unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "Link clicked: https://example.com\nLink clicked: \n");
    }

    #[test]
    fn test_router_forwards_every_activation_in_order() {
        let (mut tree, first, second) = two_blocks();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let router = LinkEventRouter::new(move |source: NodeId, reference: &str| -> anyhow::Result<()> {
            sink.borrow_mut().push((source, reference.to_string()));
            Ok(())
        });
        router.attach_all(&mut tree, [first, second]).unwrap();

        activate(&mut tree, first, "a");
        activate(&mut tree, second, "");
        activate(&mut tree, first, "a");
        activate(&mut tree, second, "ünïcødé ✓");

        assert_eq!(
            *seen.borrow(),
            vec![
                (first, "a".to_string()),
                (second, String::new()),
                (first, "a".to_string()),
                (second, "ünïcødé ✓".to_string()),
            ]
        );
        assert_eq!(router.delivered(), 4);
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let (mut tree, first, second) = two_blocks();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let router = LinkEventRouter::new(move |_: NodeId, reference: &str| -> anyhow::Result<()> {
            counter.set(counter.get() + 1);
            if reference == "boom" {
                anyhow::bail!("handler exploded");
            }
            Ok(())
        });
        router.attach(&mut tree, first).unwrap();
        router.attach(&mut tree, second).unwrap();

        activate(&mut tree, first, "boom");
        activate(&mut tree, second, "fine");

        assert_eq!(calls.get(), 2);
        assert_eq!(router.delivered(), 2);
        assert_eq!(router.failures(), 1);
    }

    #[test]
    fn test_detach_stops_forwarding() {
        let (mut tree, first, _) = two_blocks();
        let router = LinkEventRouter::new(|_: NodeId, _: &str| -> anyhow::Result<()> { Ok(()) });
        let id = router.attach(&mut tree, first).unwrap();
        activate(&mut tree, first, "one");
        assert!(router.detach(&mut tree, first, id));
        activate(&mut tree, first, "two");
        assert_eq!(router.delivered(), 1);
    }

    #[test]
    fn test_attach_rejects_non_block() {
        let mut tree = LayoutTree::new();
        let stack = tree.stack(StackStyle::default());
        let router = LinkEventRouter::new(|_: NodeId, _: &str| -> anyhow::Result<()> { Ok(()) });
        assert_eq!(
            router.attach(&mut tree, stack),
            Err(LayoutError::NotABlock(stack))
        );
    }

    #[test]
    fn test_dispatch_from_inside_handler_is_delivered_after() {
        let (_, block, _) = two_blocks();
        let slot: Rc<RefCell<Option<LinkEventRouter>>> = Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let inner = Rc::clone(&slot);
        let sink = Rc::clone(&seen);
        let router = LinkEventRouter::new(move |source: NodeId, reference: &str| -> anyhow::Result<()> {
            sink.borrow_mut().push(reference.to_string());
            if reference == "outer" {
                if let Some(router) = inner.borrow().as_ref() {
                    router.dispatch(source, "nested");
                    router.dispatch(source, "nested again");
                }
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(router.clone());

        router.dispatch(block, "outer");
        assert_eq!(*seen.borrow(), vec!["outer", "nested", "nested again"]);
        assert_eq!(router.delivered(), 3);

        router.dispatch(block, "later");
        assert_eq!(seen.borrow().last().map(String::as_str), Some("later"));
        assert_eq!(router.delivered(), 4);
        slot.borrow_mut().take();
    }

    #[test]
    #[should_panic(expected = "handler bug")]
    fn test_handler_panic_is_not_caught() {
        let (_, block, _) = two_blocks();
        let router = LinkEventRouter::new(|_: NodeId, _: &str| -> anyhow::Result<()> {
            panic!("handler bug")
        });
        router.dispatch(block, "https://example.com");
    }

    #[test]
    fn test_link_log_collects_printer_output() {
        let log = LinkLog::new();
        let router = LinkEventRouter::new(LinkPrinter::new(log.clone()));
        let (_, block, _) = two_blocks();
        assert!(log.is_empty());
        router.dispatch(block, "https://a.example");
        router.dispatch(block, "https://b.example");
        assert_eq!(log.last_line().as_deref(), Some("Link clicked: https://b.example"));
        assert!(log.contents().contains("Link clicked: https://a.example\n"));
    }

    proptest! {
        #[test]
        fn printer_output_contains_reference_verbatim(reference in any::<String>()) {
            let log = LinkLog::new();
            let mut printer = LinkPrinter::new(log.clone());
            let (_, block, _) = two_blocks();
            prop_assert!(printer.on_link(block, &reference).is_ok());
            let contents = log.contents();
            prop_assert!(contents.contains(&reference));
            prop_assert!(contents.starts_with("Link clicked: "));
        }
    }
}
