use std::fmt;
use std::ops::Range;

use super::LayoutError;
use crate::block::ContentBlock;

/// Index of a node inside one [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Space reserved inside a container, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    pub const fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Vertical stack metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackStyle {
    pub spacing: u32,
    pub padding: Padding,
}

impl StackStyle {
    pub const fn new(spacing: u32, padding: Padding) -> Self {
        Self { spacing, padding }
    }

    /// `padding.top + padding.bottom + spacing * (n - 1) + sum(heights)`,
    /// with no spacing term for zero or one child.
    pub fn measure(&self, heights: impl IntoIterator<Item = u32>) -> u32 {
        let (count, sum) = heights
            .into_iter()
            .fold((0u32, 0u32), |(count, sum), height| {
                (count.saturating_add(1), sum.saturating_add(height))
            });
        let gaps = self.spacing.saturating_mul(count.saturating_sub(1));
        self.padding.vertical().saturating_add(gaps).saturating_add(sum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// Section title.
    Header,
    /// Description above a content block.
    Caption,
}

/// Fixed-height, width-insensitive text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    text: String,
    height: u32,
    role: LabelRole,
}

impl Label {
    pub fn new(text: impl Into<String>, height: u32, role: LabelRole) -> Self {
        Self {
            text: text.into(),
            height,
            role,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn role(&self) -> LabelRole {
        self.role
    }
}

#[derive(Debug)]
pub enum NodeKind {
    /// Vertical container; its height is derived from its children.
    Stack(StackStyle),
    Label(Label),
    Block(Box<dyn ContentBlock>),
}

/// One node's height moving from `old` to `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub node: NodeId,
    pub old: u32,
    pub new: u32,
}

/// Handle returned by [`LayoutTree::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Absolute rectangle of a node, in tree pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub node: NodeId,
    pub depth: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// Deepest node under a point, with the point in that node's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub node: NodeId,
    pub x: u32,
    pub y: u32,
}

type Observer = Box<dyn FnMut(&SizeChange)>;

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    width: u32,
    height: u32,
    observers: Vec<(ObserverId, Observer)>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Arena of stacks, labels and content blocks.
///
/// Heights flow up: every mutation re-measures the touched node, then its
/// ancestors one level at a time, and stops at the first level whose height
/// did not change. Widths flow down from [`LayoutTree::set_width`].
///
/// Every mutating call returns the [`SizeChange`]s it caused, ordered from
/// the deepest node to the shallowest. Observers registered on a node run
/// right after that node's height is written, before its parent is
/// re-measured.
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: Vec<Node>,
    next_observer: u64,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stack(&mut self, style: StackStyle) -> NodeId {
        let height = style.measure(std::iter::empty());
        self.insert(NodeKind::Stack(style), height)
    }

    pub fn label(&mut self, label: Label) -> NodeId {
        let height = label.height();
        self.insert(NodeKind::Label(label), height)
    }

    pub fn block(&mut self, block: Box<dyn ContentBlock>) -> NodeId {
        let height = block.intrinsic_height();
        self.insert(NodeKind::Block(block), height)
    }

    fn insert(&mut self, kind: NodeKind, height: u32) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            width: 0,
            height,
            observers: Vec::new(),
        });
        id
    }

    /// Ids are only ever handed out by this tree, so a miss is a caller bug.
    #[track_caller]
    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(node) => node,
            None => panic!("node {id} does not belong to this tree"),
        }
    }

    #[track_caller]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(node) => node,
            None => panic!("node {id} does not belong to this tree"),
        }
    }

    /// Last committed height.
    pub fn intrinsic_height(&self, id: NodeId) -> u32 {
        self.node(id).height
    }

    pub fn width(&self, id: NodeId) -> u32 {
        self.node(id).width
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn label_of(&self, id: NodeId) -> Option<&Label> {
        match &self.node(id).kind {
            NodeKind::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn block_of(&self, id: NodeId) -> Option<&dyn ContentBlock> {
        match &self.node(id).kind {
            NodeKind::Block(block) => Some(block.as_ref()),
            _ => None,
        }
    }

    /// Mutable access for subscriptions and activation. Call
    /// [`LayoutTree::refresh`] afterwards if the block's height may change.
    pub fn block_of_mut(&mut self, id: NodeId) -> Option<&mut dyn ContentBlock> {
        match &mut self.node_mut(id).kind {
            NodeKind::Block(block) => Some(block.as_mut()),
            _ => None,
        }
    }

    /// Height the node would have now, from its current inputs.
    pub fn measure(&self, id: NodeId) -> u32 {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Stack(style) => {
                style.measure(node.children.iter().map(|child| self.node(*child).height))
            }
            NodeKind::Label(label) => label.height(),
            NodeKind::Block(block) => block.intrinsic_height(),
        }
    }

    /// Append `child` to the stack `parent` and propagate the new height.
    ///
    /// # Errors
    /// [`LayoutError::NotAContainer`] if `parent` is not a stack,
    /// [`LayoutError::AlreadyAttached`] if `child` has a parent, and
    /// [`LayoutError::Cycle`] if `child` is `parent` or one of its ancestors.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<Vec<SizeChange>, LayoutError> {
        let inner_width = match &self.node(parent).kind {
            NodeKind::Stack(style) => self.node(parent).width.saturating_sub(style.padding.horizontal()),
            _ => return Err(LayoutError::NotAContainer(parent)),
        };
        if let Some(existing) = self.node(child).parent {
            return Err(LayoutError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(LayoutError::Cycle { parent, child });
        }

        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);

        let mut changes = Vec::new();
        if inner_width != self.node(child).width {
            self.apply_width(child, inner_width, &mut changes);
        }
        self.settle_from(parent, &mut changes);
        Ok(changes)
    }

    /// Detach `child` from `parent` and re-settle `parent`.
    ///
    /// The detached subtree keeps its sizes and may be attached again.
    ///
    /// # Errors
    /// [`LayoutError::NotAChild`] if `child` is not directly under `parent`.
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<Vec<SizeChange>, LayoutError> {
        let position = self
            .node(parent)
            .children
            .iter()
            .position(|&existing| existing == child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        self.node_mut(parent).children.remove(position);
        self.node_mut(child).parent = None;

        let mut changes = Vec::new();
        self.settle_from(parent, &mut changes);
        Ok(changes)
    }

    /// Assign a width to `id`, lay out its subtree at the derived widths,
    /// then propagate any height change upward.
    pub fn set_width(&mut self, id: NodeId, width: u32) -> Vec<SizeChange> {
        let mut changes = Vec::new();
        let before = self.node(id).height;
        self.apply_width(id, width, &mut changes);
        if self.node(id).height != before {
            if let Some(parent) = self.node(id).parent {
                self.settle_from(parent, &mut changes);
            }
        }
        changes
    }

    /// Replace a block's text and propagate its new height.
    ///
    /// # Errors
    /// [`LayoutError::NotABlock`] if `id` is not a content block.
    pub fn replace_text(
        &mut self,
        id: NodeId,
        text: String,
    ) -> Result<Vec<SizeChange>, LayoutError> {
        let NodeKind::Block(block) = &mut self.node_mut(id).kind else {
            return Err(LayoutError::NotABlock(id));
        };
        let height = block.set_text(text);
        Ok(self.propagate(id, height))
    }

    /// Re-read a node's height from its inputs and propagate any change.
    pub fn refresh(&mut self, id: NodeId) -> Vec<SizeChange> {
        let height = self.measure(id);
        self.propagate(id, height)
    }

    fn propagate(&mut self, id: NodeId, height: u32) -> Vec<SizeChange> {
        let mut changes = Vec::new();
        if self.commit(id, height, &mut changes) {
            if let Some(parent) = self.node(id).parent {
                self.settle_from(parent, &mut changes);
            }
        }
        changes
    }

    /// Watch height changes of one node.
    pub fn observe(
        &mut self,
        id: NodeId,
        observer: impl FnMut(&SizeChange) + 'static,
    ) -> ObserverId {
        let handle = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.node_mut(id).observers.push((handle, Box::new(observer)));
        handle
    }

    pub fn unobserve(&mut self, handle: ObserverId) -> bool {
        for node in &mut self.nodes {
            if let Some(pos) = node.observers.iter().position(|(id, _)| *id == handle) {
                node.observers.remove(pos);
                return true;
            }
        }
        false
    }

    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |current| self.node(*current).parent)
    }

    fn apply_width(&mut self, id: NodeId, width: u32, changes: &mut Vec<SizeChange>) {
        self.node_mut(id).width = width;

        let inner = match &self.node(id).kind {
            NodeKind::Stack(style) => Some(width.saturating_sub(style.padding.horizontal())),
            _ => None,
        };
        if let Some(inner) = inner {
            for child in self.node(id).children.clone() {
                self.apply_width(child, inner, changes);
            }
        }

        let laid_out = match &mut self.node_mut(id).kind {
            NodeKind::Block(block) => Some(block.layout(width)),
            _ => None,
        };
        let height = match laid_out {
            Some(height) => height,
            None => self.measure(id),
        };
        self.commit(id, height, changes);
    }

    /// Re-measure `start` and its ancestors until a level stays the same.
    fn settle_from(&mut self, start: NodeId, changes: &mut Vec<SizeChange>) {
        let mut current = Some(start);
        while let Some(id) = current {
            let height = self.measure(id);
            if !self.commit(id, height, changes) {
                break;
            }
            current = self.node(id).parent;
        }
    }

    fn commit(&mut self, id: NodeId, height: u32, changes: &mut Vec<SizeChange>) -> bool {
        let node = self.node_mut(id);
        if node.height == height {
            return false;
        }
        let change = SizeChange {
            node: id,
            old: node.height,
            new: height,
        };
        node.height = height;
        for (_, observer) in &mut node.observers {
            observer(&change);
        }
        tracing::trace!(node = %id, old = change.old, new = change.new, "height changed");
        changes.push(change);
        true
    }

    /// Children of a stack with their origin inside it.
    fn child_origins(&self, id: NodeId) -> Vec<(NodeId, u32, u32)> {
        let node = self.node(id);
        let NodeKind::Stack(style) = &node.kind else {
            return Vec::new();
        };
        let mut y = style.padding.top;
        node.children
            .iter()
            .map(|child| {
                let origin = (*child, style.padding.left, y);
                y = y
                    .saturating_add(self.node(*child).height)
                    .saturating_add(style.spacing);
                origin
            })
            .collect()
    }

    /// Origin of `id` relative to the top of its root.
    pub fn position_of(&self, id: NodeId) -> (u32, u32) {
        let mut x = 0u32;
        let mut y = 0u32;
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if let Some((_, cx, cy)) = self
                .child_origins(parent)
                .into_iter()
                .find(|(child, _, _)| *child == current)
            {
                x = x.saturating_add(cx);
                y = y.saturating_add(cy);
            }
            current = parent;
        }
        (x, y)
    }

    /// Deepest node under `(x, y)`, measured from the top-left of `root`.
    pub fn hit_test(&self, root: NodeId, x: u32, y: u32) -> Option<Hit> {
        let node = self.node(root);
        if x >= node.width || y >= node.height {
            return None;
        }
        for (child, cx, cy) in self.child_origins(root) {
            if x >= cx && y >= cy {
                if let Some(hit) = self.hit_test(child, x - cx, y - cy) {
                    return Some(hit);
                }
            }
        }
        Some(Hit { node: root, x, y })
    }

    /// Pre-order placements of every node intersecting `rows`, skipping
    /// subtrees that lie entirely outside it.
    pub fn placements(&self, root: NodeId, rows: Range<u32>) -> Vec<Placement> {
        let mut out = Vec::new();
        self.collect_placements(root, 0, 0, 0, &rows, &mut out);
        out
    }

    fn collect_placements(
        &self,
        id: NodeId,
        depth: usize,
        x: u32,
        y: u32,
        rows: &Range<u32>,
        out: &mut Vec<Placement>,
    ) {
        let node = self.node(id);
        let placement = Placement {
            node: id,
            depth,
            x,
            y,
            width: node.width,
            height: node.height,
        };
        if placement.bottom() <= rows.start || placement.y >= rows.end {
            return;
        }
        out.push(placement);
        for (child, cx, cy) in self.child_origins(id) {
            self.collect_placements(
                child,
                depth + 1,
                x.saturating_add(cx),
                y.saturating_add(cy),
                rows,
                out,
            );
        }
    }
}
