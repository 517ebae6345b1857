//! Vertical scroll window over the document.
//!
//! [`ScrollViewport`] owns the layout tree and the [`DocumentRoot`] built
//! into it. It never resizes the document: the document's intrinsic height
//! only extends or shrinks the scrollable range, and the scroll offset is
//! clamped whenever that range shrinks below it.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

use crate::document::{DemoSpec, DocumentRoot, Metrics};
use crate::layout::{LayoutError, LayoutTree, NodeId, Placement, SizeChange};
use crate::source::DocumentSource;

/// A link activated through [`ScrollViewport::activate_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub block: NodeId,
    pub reference: String,
}

/// Scroll state shared with the root observer, so any settled change that
/// reaches the document re-clamps the offset.
#[derive(Debug)]
struct Window {
    content: Cell<u32>,
    height: Cell<u32>,
    offset: Cell<u32>,
}

impl Window {
    fn range(&self) -> u32 {
        self.content.get().saturating_sub(self.height.get())
    }

    fn set_offset(&self, offset: u32) {
        self.offset.set(offset.min(self.range()));
    }

    fn clamp(&self) {
        let range = self.range();
        let offset = self.offset.get();
        if offset > range {
            tracing::debug!(from = offset, to = range, "clamping scroll offset");
            self.offset.set(range);
        }
    }
}

/// Fixed-size window over a [`DocumentRoot`], scrolling vertically only.
///
/// All sizes and offsets are layout pixels.
///
/// # Example
///
/// ```
/// use stackview::document::{demo_catalog, Metrics};
/// use stackview::source::StaticSource;
/// use stackview::viewport::ScrollViewport;
///
/// let spec = demo_catalog().unwrap();
/// let mut vp = ScrollViewport::build(&spec, &Metrics::default(), &StaticSource::new(), (1400, 900)).unwrap();
/// assert!(!vp.do_scroll_x());
/// vp.scroll_down(100);
/// assert_eq!(vp.visible_range(), 100..1000);
/// ```
#[derive(Debug)]
pub struct ScrollViewport {
    tree: LayoutTree,
    document: DocumentRoot,
    width: u32,
    window: Rc<Window>,
}

impl ScrollViewport {
    /// Take ownership of a built document and lay it out at `width`.
    pub fn new(mut tree: LayoutTree, document: DocumentRoot, width: u32, height: u32) -> Self {
        let window = Rc::new(Window {
            content: Cell::new(tree.intrinsic_height(document.node())),
            height: Cell::new(height),
            offset: Cell::new(0),
        });
        let sink = Rc::clone(&window);
        tree.observe(document.node(), move |change| {
            sink.content.set(change.new);
            sink.clamp();
        });
        tree.set_width(document.node(), width);

        tracing::debug!(width, height, content = window.content.get(), "viewport attached");
        Self {
            tree,
            document,
            width,
            window,
        }
    }

    /// Build `spec` into a fresh tree and wrap it in a viewport of `size`.
    ///
    /// # Errors
    /// Propagates [`LayoutError`] from the document builder.
    pub fn build(
        spec: &DemoSpec,
        metrics: &Metrics,
        source: &dyn DocumentSource,
        (width, height): (u32, u32),
    ) -> Result<Self, LayoutError> {
        let mut tree = LayoutTree::new();
        let document = DocumentRoot::build(&mut tree, spec, metrics, source)?;
        Ok(Self::new(tree, document, width, height))
    }

    pub const fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub const fn document(&self) -> &DocumentRoot {
        &self.document
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.window.height.get()
    }

    pub fn offset(&self) -> u32 {
        self.window.offset.get()
    }

    /// The document's current intrinsic height.
    pub fn content_height(&self) -> u32 {
        self.window.content.get()
    }

    pub const fn do_scroll_x(&self) -> bool {
        false
    }

    pub const fn do_scroll_y(&self) -> bool {
        true
    }

    /// Largest valid offset: `max(0, content_height - height)`.
    pub fn scroll_range(&self) -> u32 {
        self.window.range()
    }

    /// Document rows currently inside the window.
    pub fn visible_range(&self) -> Range<u32> {
        let offset = self.offset();
        let end = offset
            .saturating_add(self.height())
            .min(self.content_height());
        offset..end.max(offset)
    }

    /// Scroll position as a percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let range = self.scroll_range();
        if range == 0 {
            return 100;
        }
        // Percentage value always 0-100
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((f64::from(self.offset()) / f64::from(range)) * 100.0).round() as u8
        }
    }

    pub fn can_scroll_up(&self) -> bool {
        self.offset() > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.offset() < self.scroll_range()
    }

    pub fn scroll_up(&mut self, n: u32) {
        self.window.set_offset(self.offset().saturating_sub(n));
    }

    pub fn scroll_down(&mut self, n: u32) {
        self.window.set_offset(self.offset().saturating_add(n));
    }

    /// Scroll by a signed number of pixels, clamped to the valid range.
    pub fn scroll_by(&mut self, delta: i64) {
        let magnitude = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        if delta < 0 {
            self.scroll_up(magnitude);
        } else {
            self.scroll_down(magnitude);
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(self.height() / 2);
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.height() / 2);
    }

    pub fn go_to_top(&mut self) {
        self.window.set_offset(0);
    }

    pub fn go_to_bottom(&mut self) {
        self.window.set_offset(self.scroll_range());
    }

    /// Put document row `y` at the top of the window, clamped.
    pub fn scroll_to(&mut self, y: u32) {
        self.window.set_offset(y);
    }

    pub fn go_to_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target =
            (f64::from(self.scroll_range()) * f64::from(percent) / 100.0).round() as u32;
        self.window.set_offset(target);
    }

    /// Scroll so `node` starts at the top of the window.
    pub fn scroll_to_node(&mut self, node: NodeId) {
        let (_, y) = self.tree.position_of(node);
        self.scroll_to(y);
    }

    /// Jump to the first section starting below the current offset.
    pub fn next_section(&mut self) {
        let offset = self.offset();
        let next = self
            .section_tops()
            .into_iter()
            .find(|top| *top > offset);
        if let Some(top) = next {
            self.scroll_to(top);
        }
    }

    /// Jump to the last section starting above the current offset.
    pub fn prev_section(&mut self) {
        let offset = self.offset();
        let prev = self
            .section_tops()
            .into_iter()
            .rev()
            .find(|top| *top < offset);
        self.scroll_to(prev.unwrap_or(0));
    }

    fn section_tops(&self) -> Vec<u32> {
        self.document
            .list_sections()
            .iter()
            .map(|section| self.tree.position_of(section.node()).1)
            .collect()
    }

    /// Change the window size. A new width re-lays out the document.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window.height.set(height);
        if width != self.width {
            self.width = width;
            let _scope = crate::perf::scope("viewport.relayout");
            self.tree.set_width(self.document.node(), width);
        }
        self.window.clamp();
    }

    /// Replace the text of one block and settle the document.
    ///
    /// # Errors
    /// [`LayoutError::NotABlock`] if `node` is not a content block.
    pub fn replace_text(
        &mut self,
        node: NodeId,
        text: String,
    ) -> Result<Vec<SizeChange>, LayoutError> {
        self.tree.replace_text(node, text)
    }

    /// Run `f` against the tree. Changes reaching the root re-clamp the
    /// offset through the root observer.
    pub fn with_tree<R>(&mut self, f: impl FnOnce(&mut LayoutTree) -> R) -> R {
        f(&mut self.tree)
    }

    /// Every node intersecting the window, in document coordinates.
    pub fn placements(&self) -> Vec<Placement> {
        self.tree
            .placements(self.document.node(), self.visible_range())
    }

    /// Activate the link under a window-relative point, if there is one.
    pub fn activate_at(&mut self, x: u32, y: u32) -> Option<Activation> {
        let hit = self
            .tree
            .hit_test(self.document.node(), x, y.saturating_add(self.offset()))?;
        let reference = self
            .tree
            .block_of(hit.node)?
            .link_at(hit.x, hit.y)?
            .to_string();

        crate::perf::log_event(
            "viewport.activate",
            format!("block={} reference={reference}", hit.node),
        );
        self.tree.block_of_mut(hit.node)?.activate(&reference);
        Some(Activation {
            block: hit.node,
            reference,
        })
    }

    /// Mutable access to the tree. Mutations settle through the same
    /// notifications as [`Self::replace_text`], so the offset stays valid.
    pub const fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::block::testing::FixedBlock;
    use crate::document::{SectionSpec, VariationSpec};
    use crate::layout::StackStyle;
    use crate::source::StaticSource;
    use crate::style::StyleConfig;

    fn flat_metrics(header_height: u32) -> Metrics {
        Metrics {
            root: StackStyle::default(),
            section: StackStyle::default(),
            cell: StackStyle::default(),
            header_height,
            caption_height: 0,
        }
    }

    /// A document exactly `content` pixels tall.
    fn flat(content: u32, height: u32) -> ScrollViewport {
        let spec = DemoSpec::new("").with_section(SectionSpec::new("only"));
        let mut tree = LayoutTree::new();
        let doc =
            DocumentRoot::build(&mut tree, &spec, &flat_metrics(content), &StaticSource::new())
                .unwrap();
        ScrollViewport::new(tree, doc, 80, height)
    }

    /// One fixed block whose height is its text; every point links to `link`.
    fn with_block(content: u32, height: u32) -> (ScrollViewport, NodeId) {
        let spec = DemoSpec::new(content.to_string()).with_section(
            SectionSpec::new("only").with(VariationSpec::new("cell", StyleConfig::default())),
        );
        let mut tree = LayoutTree::new();
        let doc = DocumentRoot::build_with(
            &mut tree,
            &spec,
            &flat_metrics(0),
            &StaticSource::new(),
            |text, _| Box::new(FixedBlock::new(text.parse().unwrap()).with_link("https://example.com")),
        )
        .unwrap();
        let block = doc.content_blocks()[0];
        (ScrollViewport::new(tree, doc, 80, height), block)
    }

    #[test]
    fn test_new_viewport_starts_at_top() {
        let vp = flat(100, 24);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.content_height(), 100);
    }

    #[test]
    fn test_scroll_axes() {
        let vp = flat(100, 24);
        assert!(!vp.do_scroll_x());
        assert!(vp.do_scroll_y());
    }

    #[test]
    fn test_demo_window_scroll_range() {
        let spec = DemoSpec::new("").with_section(SectionSpec::new("tall"));
        let metrics = Metrics {
            header_height: 4950,
            ..Metrics::default()
        };
        let vp = ScrollViewport::build(&spec, &metrics, &StaticSource::new(), (1400, 900)).unwrap();
        assert_eq!(vp.content_height(), 5000);
        assert_eq!(vp.scroll_range(), 4100);
        assert!(!vp.do_scroll_x());
    }

    #[test]
    fn test_short_document_has_no_range() {
        let mut vp = flat(10, 24);
        assert_eq!(vp.scroll_range(), 0);
        vp.scroll_down(5);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.visible_range(), 0..10);
    }

    #[test]
    fn test_visible_range_at_top() {
        let vp = flat(100, 24);
        assert_eq!(vp.visible_range(), 0..24);
    }

    #[test]
    fn test_visible_range_at_bottom() {
        let mut vp = flat(100, 24);
        vp.go_to_bottom();
        assert_eq!(vp.visible_range(), 76..100);
    }

    #[test]
    fn test_scroll_down_clamps_to_max() {
        let mut vp = flat(100, 24);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 76);
    }

    #[test]
    fn test_scroll_up_clamps_to_zero() {
        let mut vp = flat(100, 24);
        vp.scroll_down(10);
        vp.scroll_up(100);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_scroll_by_signed_delta() {
        let mut vp = flat(100, 24);
        vp.scroll_by(30);
        assert_eq!(vp.offset(), 30);
        vp.scroll_by(-12);
        assert_eq!(vp.offset(), 18);
        vp.scroll_by(i64::MIN);
        assert_eq!(vp.offset(), 0);
        vp.scroll_by(i64::MAX);
        assert_eq!(vp.offset(), 76);
    }

    #[test]
    fn test_page_and_half_page() {
        let mut vp = flat(100, 24);
        vp.page_down();
        assert_eq!(vp.offset(), 24);
        vp.half_page_down();
        assert_eq!(vp.offset(), 36);
        vp.half_page_up();
        assert_eq!(vp.offset(), 24);
        vp.page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_go_to_percent_fifty() {
        let mut vp = flat(100, 24);
        vp.go_to_percent(50);
        assert_eq!(vp.offset(), 38);
        assert_eq!(vp.scroll_percent(), 50);
    }

    #[test]
    fn test_scroll_percent_empty_document() {
        let vp = flat(0, 24);
        assert_eq!(vp.scroll_percent(), 100);
        assert_eq!(vp.visible_range(), 0..0);
    }

    #[test]
    fn test_can_scroll_flags() {
        let mut vp = flat(100, 24);
        assert!(!vp.can_scroll_up());
        assert!(vp.can_scroll_down());
        vp.go_to_bottom();
        assert!(vp.can_scroll_up());
        assert!(!vp.can_scroll_down());
    }

    #[test]
    fn test_resize_keeps_valid_offset() {
        let mut vp = flat(100, 24);
        vp.scroll_down(50);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 40);
    }

    #[test]
    fn test_content_shrink_clamps_offset() {
        let (mut vp, block) = with_block(1000, 100);
        vp.go_to_bottom();
        assert_eq!(vp.offset(), 900);

        vp.replace_text(block, "500".to_string()).unwrap();
        assert_eq!(vp.content_height(), 500);
        assert_eq!(vp.offset(), 400);

        vp.replace_text(block, "50".to_string()).unwrap();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_content_growth_keeps_offset() {
        let (mut vp, block) = with_block(1000, 100);
        vp.scroll_to(300);
        vp.replace_text(block, "2000".to_string()).unwrap();
        assert_eq!(vp.offset(), 300);
        assert_eq!(vp.scroll_range(), 1900);
    }

    #[test]
    fn test_with_tree_clamps_after_mutation() {
        let (mut vp, block) = with_block(1000, 100);
        vp.go_to_bottom();
        vp.with_tree(|tree| tree.replace_text(block, "10".to_string()).unwrap());
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_tree_handle_mutation_clamps_offset() {
        let (mut vp, block) = with_block(1000, 100);
        vp.go_to_bottom();
        assert_eq!(vp.offset(), 900);

        vp.tree_mut().replace_text(block, "50".to_string()).unwrap();
        assert_eq!(vp.content_height(), 50);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.visible_range(), 0..50);

        vp.tree_mut().replace_text(block, "400".to_string()).unwrap();
        vp.go_to_bottom();
        vp.tree_mut().replace_text(block, "250".to_string()).unwrap();
        assert_eq!(vp.offset(), 150);
    }

    #[test]
    fn test_activate_at_delivers_link() {
        let (mut vp, block) = with_block(1000, 100);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        vp.tree_mut()
            .block_of_mut(block)
            .unwrap()
            .subscribe(Box::new(move |reference| sink.borrow_mut().push(reference.to_string())));

        vp.scroll_to(200);
        let activation = vp.activate_at(5, 5).unwrap();
        assert_eq!(activation.block, block);
        assert_eq!(activation.reference, "https://example.com");
        assert_eq!(*seen.borrow(), vec!["https://example.com".to_string()]);

        // Outside the window width.
        assert!(vp.activate_at(500, 5).is_none());
    }

    #[test]
    fn test_section_navigation() {
        let spec = DemoSpec::new("")
            .with_section(SectionSpec::new("a"))
            .with_section(SectionSpec::new("b"))
            .with_section(SectionSpec::new("c"));
        let mut vp = ScrollViewport::build(&spec, &flat_metrics(100), &StaticSource::new(), (80, 50))
            .unwrap();
        vp.next_section();
        assert_eq!(vp.offset(), 100);
        vp.next_section();
        assert_eq!(vp.offset(), 200);
        // Already at the last section; range is 250.
        vp.next_section();
        assert_eq!(vp.offset(), 200);
        vp.prev_section();
        assert_eq!(vp.offset(), 100);
        vp.prev_section();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_placements_follow_scroll() {
        let spec = DemoSpec::new("")
            .with_section(SectionSpec::new("a"))
            .with_section(SectionSpec::new("b"));
        let mut vp = ScrollViewport::build(&spec, &flat_metrics(100), &StaticSource::new(), (80, 50))
            .unwrap();
        vp.scroll_to(120);
        let titles: Vec<&str> = vp
            .placements()
            .iter()
            .filter_map(|placement| vp.tree().label_of(placement.node))
            .map(|label| label.text())
            .collect();
        assert_eq!(titles, vec!["b"]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn scroll_never_exceeds_range(
                content in 0..10000u32,
                height in 1..1000u32,
                amount in 0..20000u32,
            ) {
                let mut vp = flat(content, height);
                vp.scroll_down(amount);
                prop_assert!(vp.offset() <= content.saturating_sub(height));
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end <= content.max(range.start));
                prop_assert!(vp.scroll_percent() <= 100);
            }

            #[test]
            fn shrinking_content_always_clamps(
                start in 1..5000u32,
                end in 0..5000u32,
                height in 1..500u32,
            ) {
                let (mut vp, block) = with_block(start, height);
                vp.go_to_bottom();
                vp.replace_text(block, end.to_string()).unwrap();
                prop_assert_eq!(vp.content_height(), end);
                prop_assert!(vp.offset() <= vp.scroll_range());
            }
        }
    }
}
