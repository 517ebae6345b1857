//! Laid-out lines of a content block.

use unicode_width::UnicodeWidthStr;

/// Font scale for heading levels 1 through 6.
const HEADING_SCALE: [f32; 6] = [2.0, 1.5, 1.17, 1.0, 0.83, 0.67];

/// Type of a rendered line, used for sizing and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Code block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Empty line
    Empty,
}

impl LineType {
    /// Multiplier applied to the block's font size for this line.
    pub fn font_scale(self) -> f32 {
        match self {
            Self::Heading(level) => {
                HEADING_SCALE[usize::from(level.clamp(1, 6)) - 1]
            }
            _ => 1.0,
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

/// A styled inline span, optionally carrying a link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
    link: Option<String>,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self {
            text,
            style,
            link: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text.into(), InlineStyle::default())
    }

    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.style.link = true;
        self.link = Some(url.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.text.width()
    }

    /// Same style and link, different text.
    pub(crate) fn restyled(&self, text: String) -> Self {
        Self {
            text,
            style: self.style,
            link: self.link.clone(),
        }
    }
}

/// One wrapped line, positioned inside its block.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    y: u32,
    height: u32,
    x: u32,
    advance: f32,
    line_type: LineType,
    spans: Vec<InlineSpan>,
}

impl VisualLine {
    pub(crate) const fn new(
        y: u32,
        height: u32,
        x: u32,
        advance: f32,
        line_type: LineType,
        spans: Vec<InlineSpan>,
    ) -> Self {
        Self {
            y,
            height,
            x,
            advance,
            line_type,
            spans,
        }
    }

    /// Top edge relative to the block.
    pub const fn y(&self) -> u32 {
        self.y
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Left edge relative to the block, after padding and alignment.
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Horizontal pixels per column on this line.
    pub const fn advance(&self) -> f32 {
        self.advance
    }

    pub const fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(InlineSpan::text).collect()
    }

    pub const fn contains_y(&self, y: u32) -> bool {
        y >= self.y && y < self.y.saturating_add(self.height)
    }

    /// Span covering display column `column`, if any.
    pub fn span_at_column(&self, column: usize) -> Option<&InlineSpan> {
        let mut start = 0;
        for span in &self.spans {
            let end = start + span.width();
            if column >= start && column < end {
                return Some(span);
            }
            start = end;
        }
        None
    }
}
