//! The demo document: sections of captioned content blocks.
//!
//! The structure is fixed at build time:
//!
//! ```text
//! root stack
//! └── section stack (one per SectionSpec)
//!     ├── header label
//!     └── cell stack (one per VariationSpec)
//!         ├── caption label
//!         └── content block
//! ```
//!
//! [`DocumentRoot`] keeps typed handles to every level so callers can walk
//! sections and blocks without inspecting node kinds.

mod catalog;

pub use catalog::{SAMPLE_MARKDOWN, WINDOW_SIZE, WINDOW_TITLE, demo_catalog};

use crate::block::{ContentBlock, MarkdownBlock};
use crate::layout::{Label, LabelRole, LayoutError, LayoutTree, NodeId, Padding, StackStyle};
use crate::source::{CANONICAL_DOCUMENT, DocumentSource, load_or_fallback};
use crate::style::StyleConfig;

/// Which text a cell's block is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellContent {
    /// The sample text shared by every variation.
    Sample,
    /// The canonical document, loaded through the document source.
    FullDocument,
}

/// One captioned style variation.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationSpec {
    caption: String,
    style: StyleConfig,
    content: CellContent,
}

impl VariationSpec {
    pub fn new(caption: impl Into<String>, style: StyleConfig) -> Self {
        Self {
            caption: caption.into(),
            style,
            content: CellContent::Sample,
        }
    }

    pub fn full_document(caption: impl Into<String>, style: StyleConfig) -> Self {
        Self {
            content: CellContent::FullDocument,
            ..Self::new(caption, style)
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub const fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub const fn content(&self) -> CellContent {
        self.content
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    title: String,
    variations: Vec<VariationSpec>,
}

impl SectionSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            variations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, variation: VariationSpec) -> Self {
        self.variations.push(variation);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn variations(&self) -> &[VariationSpec] {
        &self.variations
    }
}

/// Static description of a whole demo document.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSpec {
    sample: String,
    document_name: String,
    sections: Vec<SectionSpec>,
}

impl DemoSpec {
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            document_name: CANONICAL_DOCUMENT.to_string(),
            sections: Vec::new(),
        }
    }

    /// Name passed to the document source for full-document cells.
    #[must_use]
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    #[must_use]
    pub fn with_section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    fn needs_full_document(&self) -> bool {
        self.sections
            .iter()
            .flat_map(SectionSpec::variations)
            .any(|variation| variation.content == CellContent::FullDocument)
    }
}

/// Fixed spacing and label heights for each level, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub root: StackStyle,
    pub section: StackStyle,
    pub cell: StackStyle,
    pub header_height: u32,
    pub caption_height: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            root: StackStyle::new(20, Padding::uniform(10)),
            section: StackStyle::new(10, Padding::new(0, 10, 0, 20)),
            cell: StackStyle::new(5, Padding::new(10, 5, 10, 5)),
            header_height: 50,
            caption_height: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub node: NodeId,
    pub caption: NodeId,
    pub block: NodeId,
    pub content: CellContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef {
    title: String,
    node: NodeId,
    header: NodeId,
    cells: Vec<CellRef>,
}

impl SectionRef {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    pub const fn header(&self) -> NodeId {
        self.header
    }

    pub fn cells(&self) -> &[CellRef] {
        &self.cells
    }
}

/// Typed view of a built document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRoot {
    node: NodeId,
    sections: Vec<SectionRef>,
}

impl DocumentRoot {
    /// Build the document into `tree` with [`MarkdownBlock`] content.
    ///
    /// # Errors
    /// Returns [`LayoutError`] only if the tree is misused, which would be
    /// a bug in the builder.
    pub fn build(
        tree: &mut LayoutTree,
        spec: &DemoSpec,
        metrics: &Metrics,
        source: &dyn DocumentSource,
    ) -> Result<Self, LayoutError> {
        Self::build_with(tree, spec, metrics, source, |text, style| {
            Box::new(MarkdownBlock::new(text, style))
        })
    }

    /// Build the document, creating each content block with `make_block`.
    ///
    /// # Errors
    /// See [`DocumentRoot::build`].
    pub fn build_with(
        tree: &mut LayoutTree,
        spec: &DemoSpec,
        metrics: &Metrics,
        source: &dyn DocumentSource,
        mut make_block: impl FnMut(String, StyleConfig) -> Box<dyn ContentBlock>,
    ) -> Result<Self, LayoutError> {
        let _scope = crate::perf::scope("document.build");
        let full_document = if spec.needs_full_document() {
            load_or_fallback(source, spec.document_name())
        } else {
            String::new()
        };

        let root = tree.stack(metrics.root);
        let mut sections = Vec::with_capacity(spec.sections().len());
        for section_spec in spec.sections() {
            let node = tree.stack(metrics.section);
            let header = tree.label(Label::new(
                section_spec.title(),
                metrics.header_height,
                LabelRole::Header,
            ));
            tree.add_child(node, header)?;

            let mut cells = Vec::with_capacity(section_spec.variations().len());
            for variation in section_spec.variations() {
                let cell = tree.stack(metrics.cell);
                let caption = tree.label(Label::new(
                    variation.caption(),
                    metrics.caption_height,
                    LabelRole::Caption,
                ));
                let text = match variation.content() {
                    CellContent::Sample => spec.sample().to_string(),
                    CellContent::FullDocument => full_document.clone(),
                };
                let block = tree.block(make_block(text, variation.style().clone()));
                tree.add_child(cell, caption)?;
                tree.add_child(cell, block)?;
                tree.add_child(node, cell)?;
                cells.push(CellRef {
                    node: cell,
                    caption,
                    block,
                    content: variation.content(),
                });
            }

            tree.add_child(root, node)?;
            sections.push(SectionRef {
                title: section_spec.title().to_string(),
                node,
                header,
                cells,
            });
        }

        tracing::debug!(
            sections = sections.len(),
            height = tree.intrinsic_height(root),
            "document built"
        );
        Ok(Self {
            node: root,
            sections,
        })
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    pub fn list_sections(&self) -> &[SectionRef] {
        &self.sections
    }

    pub fn section(&self, title: &str) -> Option<&SectionRef> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn list_content_blocks_in(&self, section: &SectionRef) -> Vec<NodeId> {
        section.cells.iter().map(|cell| cell.block).collect()
    }

    /// Every content block, top to bottom.
    pub fn content_blocks(&self) -> Vec<NodeId> {
        self.cells().map(|cell| cell.block).collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellRef> {
        self.sections.iter().flat_map(|section| section.cells.iter())
    }

    pub fn full_document_block(&self) -> Option<NodeId> {
        self.cells()
            .find(|cell| cell.content == CellContent::FullDocument)
            .map(|cell| cell.block)
    }
}
