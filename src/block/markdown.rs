//! Markdown content block backed by comrak.
//!
//! Parsing happens once per text change and produces logical lines
//! (heading, paragraph, list item, ...). Layout wraps those lines at the
//! current width using a per-font glyph advance, so the block's height is
//! driven by its text, font, size, line height and padding.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeList, NodeValue};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{InlineSpan, InlineStyle, LineType, VisualLine};
use super::{ActivationListener, Activations, ContentBlock, SubscriptionId};
use crate::style::{Halign, StyleConfig, ceil_px};

/// Rule length used before the block has been given a width.
const UNLAID_RULE_WIDTH: usize = 3;

/// A source line before wrapping.
#[derive(Debug, Clone, PartialEq)]
struct Logical {
    line_type: LineType,
    first_prefix: String,
    next_prefix: String,
    spans: Vec<InlineSpan>,
    wrap: bool,
}

impl Logical {
    fn new(line_type: LineType, prefix: &str, spans: Vec<InlineSpan>) -> Self {
        Self::hanging(line_type, prefix.to_string(), prefix.to_string(), spans)
    }

    const fn hanging(
        line_type: LineType,
        first_prefix: String,
        next_prefix: String,
        spans: Vec<InlineSpan>,
    ) -> Self {
        Self {
            line_type,
            first_prefix,
            next_prefix,
            spans,
            wrap: true,
        }
    }

    fn verbatim(line_type: LineType, prefix: &str, spans: Vec<InlineSpan>) -> Self {
        Self {
            wrap: false,
            ..Self::new(line_type, prefix, spans)
        }
    }
}

/// Markdown text rendered with one [`StyleConfig`].
///
/// # Example
///
/// ```
/// use stackview::block::{ContentBlock, MarkdownBlock};
/// use stackview::style::StyleConfig;
///
/// let mut block = MarkdownBlock::new("Hello world", StyleConfig::default());
/// let one_line = block.layout(1000);
/// let wrapped = block.layout(40);
/// assert!(wrapped > one_line);
/// ```
#[derive(Debug)]
pub struct MarkdownBlock {
    text: String,
    style: StyleConfig,
    logical: Vec<Logical>,
    lines: Vec<VisualLine>,
    width: u32,
    height: u32,
    activations: Activations,
}

impl MarkdownBlock {
    pub fn new(text: impl Into<String>, style: StyleConfig) -> Self {
        let text = text.into();
        let logical = parse_logical(&text);
        let mut block = Self {
            text,
            style,
            logical,
            lines: Vec::new(),
            width: 0,
            height: 0,
            activations: Activations::default(),
        };
        block.relayout();
        block
    }

    /// Width of the last layout; zero means "not laid out yet, don't wrap".
    pub const fn width(&self) -> u32 {
        self.width
    }

    fn relayout(&mut self) -> u32 {
        let padding = self.style.padding_px();
        let content_width = self.width.saturating_sub(padding.horizontal());
        let mut lines = Vec::new();
        let mut y = padding.top;

        for logical in &self.logical {
            let font_px = self.style.font_size() * logical.line_type.font_scale();
            let advance = glyph_advance(self.style.font_name(), font_px);
            let columns = if self.width == 0 {
                usize::MAX
            } else {
                columns_for(content_width, advance)
            };
            let height = ceil_px(font_px * self.style.line_height()).max(1);

            let wrapped = if logical.line_type == LineType::HorizontalRule {
                let len = if self.width == 0 {
                    UNLAID_RULE_WIDTH
                } else {
                    columns.saturating_sub(logical.first_prefix.width())
                };
                vec![vec![
                    InlineSpan::plain(logical.first_prefix.clone()),
                    InlineSpan::plain("─".repeat(len)),
                ]]
            } else if logical.wrap {
                wrap_spans(
                    &logical.spans,
                    columns,
                    &logical.first_prefix,
                    &logical.next_prefix,
                )
            } else {
                let mut spans = start_line(&logical.first_prefix);
                spans.extend(logical.spans.iter().cloned());
                vec![truncate_spans(&spans, columns)]
            };

            for spans in wrapped {
                let used: usize = spans.iter().map(InlineSpan::width).sum();
                let x = padding.left
                    + align_offset(self.style.halign(), content_width, used, advance);
                lines.push(VisualLine::new(
                    y,
                    height,
                    x,
                    advance,
                    logical.line_type,
                    spans,
                ));
                y = y.saturating_add(height);
            }
        }

        self.lines = lines;
        self.height = y.saturating_add(padding.bottom);
        self.height
    }
}

impl ContentBlock for MarkdownBlock {
    fn text(&self) -> &str {
        &self.text
    }

    fn style(&self) -> &StyleConfig {
        &self.style
    }

    fn layout(&mut self, width: u32) -> u32 {
        self.width = width;
        self.relayout()
    }

    fn set_text(&mut self, text: String) -> u32 {
        self.logical = parse_logical(&text);
        self.text = text;
        self.relayout()
    }

    fn intrinsic_height(&self) -> u32 {
        self.height
    }

    fn lines(&self) -> &[VisualLine] {
        &self.lines
    }

    // Column math on small pixel values.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn link_at(&self, x: u32, y: u32) -> Option<&str> {
        let line = self.lines.iter().find(|line| line.contains_y(y))?;
        let local = x.checked_sub(line.x())?;
        let column = (local as f32 / line.advance()).floor() as usize;
        line.span_at_column(column)?.link()
    }

    fn subscribe(&mut self, listener: ActivationListener) -> SubscriptionId {
        self.activations.subscribe(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.activations.unsubscribe(id)
    }

    fn activate(&mut self, reference: &str) {
        self.activations.emit(reference);
    }
}

/// Horizontal pixels per column for a font at a pixel size.
fn glyph_advance(font_name: &str, font_px: f32) -> f32 {
    let ratio = match font_name {
        "DejaVuSans" => 0.55,
        name if name.contains("Mono") => 0.6,
        _ => 0.5,
    };
    (font_px * ratio).max(1.0)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn columns_for(content_width: u32, advance: f32) -> usize {
    ((content_width as f32 / advance).floor() as usize).max(1)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn align_offset(halign: Halign, content_width: u32, used_columns: usize, advance: f32) -> u32 {
    let slack = (content_width as f32 - used_columns as f32 * advance).max(0.0);
    match halign {
        Halign::Left | Halign::Justify => 0,
        Halign::Center => (slack / 2.0).floor() as u32,
        Halign::Right => slack.floor() as u32,
    }
}

#[derive(Debug, Clone)]
struct Context {
    prefix: String,
    quoted: bool,
    depth: usize,
}

fn parse_logical(text: &str) -> Vec<Logical> {
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    let root = parse_document(&arena, text, &options);

    let mut out = Vec::new();
    let ctx = Context {
        prefix: String::new(),
        quoted: false,
        depth: 0,
    };
    visit(root, &ctx, &mut out);
    while out
        .last()
        .is_some_and(|line| line.line_type == LineType::Empty)
    {
        out.pop();
    }
    out
}

fn visit<'a>(node: &'a AstNode<'a>, ctx: &Context, out: &mut Vec<Logical>) {
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            push_blank(out, &ctx.prefix);
            out.push(Logical::new(
                LineType::Heading(heading.level),
                &ctx.prefix,
                collect_inline_spans(node),
            ));
            push_blank(out, &ctx.prefix);
        }

        NodeValue::Paragraph => {
            let line_type = if ctx.quoted {
                LineType::BlockQuote
            } else {
                LineType::Paragraph
            };
            out.push(Logical::new(line_type, &ctx.prefix, collect_inline_spans(node)));
            push_blank(out, &ctx.prefix);
        }

        NodeValue::List(list) => {
            visit_list(node, list, ctx, out);
            if ctx.depth == 0 {
                push_blank(out, &ctx.prefix);
            }
        }

        NodeValue::CodeBlock(code) => {
            let style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            let prefix = format!("{}│ ", ctx.prefix);
            for raw in code.literal.lines() {
                out.push(Logical::verbatim(
                    LineType::CodeBlock,
                    &prefix,
                    vec![InlineSpan::new(raw.to_string(), style)],
                ));
            }
            push_blank(out, &ctx.prefix);
        }

        NodeValue::BlockQuote => {
            let inner = Context {
                prefix: format!("{}│ ", ctx.prefix),
                quoted: true,
                depth: ctx.depth,
            };
            for child in node.children() {
                visit(child, &inner, out);
            }
            if out
                .last()
                .is_some_and(|line| line.line_type == LineType::Empty)
            {
                out.pop();
            }
            push_blank(out, &ctx.prefix);
        }

        NodeValue::ThematicBreak => {
            out.push(Logical::verbatim(
                LineType::HorizontalRule,
                &ctx.prefix,
                Vec::new(),
            ));
            push_blank(out, &ctx.prefix);
        }

        NodeValue::Table(_) => {
            for (header, row) in render_table(node) {
                let style = InlineStyle {
                    strong: header,
                    ..InlineStyle::default()
                };
                out.push(Logical::verbatim(
                    LineType::Table,
                    &ctx.prefix,
                    vec![InlineSpan::new(row, style)],
                ));
            }
            push_blank(out, &ctx.prefix);
        }

        NodeValue::HtmlBlock(html) => {
            for raw in html.literal.lines() {
                out.push(Logical::new(
                    LineType::Paragraph,
                    &ctx.prefix,
                    vec![InlineSpan::plain(raw)],
                ));
            }
            push_blank(out, &ctx.prefix);
        }

        _ => {
            for child in node.children() {
                visit(child, ctx, out);
            }
        }
    }
}

fn visit_list<'a>(node: &'a AstNode<'a>, list: &NodeList, ctx: &Context, out: &mut Vec<Logical>) {
    let delimiter = match list.delimiter {
        ListDelimType::Paren => ')',
        ListDelimType::Period => '.',
    };
    for (index, item) in node.children().enumerate() {
        let marker = match &item.data.borrow().value {
            NodeValue::TaskItem(Some(_)) => "✓ ".to_string(),
            NodeValue::TaskItem(None) => "□ ".to_string(),
            _ => match list.list_type {
                ListType::Bullet => "• ".to_string(),
                ListType::Ordered => format!("{}{delimiter} ", list.start + index),
            },
        };
        visit_item(item, &marker, ctx, out);
    }
}

fn visit_item<'a>(item: &'a AstNode<'a>, marker: &str, ctx: &Context, out: &mut Vec<Logical>) {
    let indent = format!("{}{}", ctx.prefix, " ".repeat(marker.width()));
    let lead = format!("{}{marker}", ctx.prefix);
    let nested = Context {
        prefix: indent.clone(),
        quoted: ctx.quoted,
        depth: ctx.depth + 1,
    };

    for (index, child) in item.children().enumerate() {
        let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
        if is_paragraph {
            let first = if index == 0 { lead.clone() } else { indent.clone() };
            out.push(Logical::hanging(
                LineType::ListItem(ctx.depth),
                first,
                indent.clone(),
                collect_inline_spans(child),
            ));
        } else {
            if index == 0 {
                out.push(Logical::new(LineType::ListItem(ctx.depth), &lead, Vec::new()));
            }
            visit(child, &nested, out);
        }
    }
}

fn push_blank(out: &mut Vec<Logical>, prefix: &str) {
    if out
        .last()
        .is_some_and(|line| line.line_type != LineType::Empty)
    {
        out.push(Logical::new(LineType::Empty, prefix.trim_end(), Vec::new()));
    }
}

fn render_table<'a>(table: &'a AstNode<'a>) -> Vec<(bool, String)> {
    let rows: Vec<(bool, Vec<String>)> = table
        .children()
        .filter(|row| matches!(row.data.borrow().value, NodeValue::TableRow(_)))
        .map(|row| {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            (header, row.children().map(extract_text).collect())
        })
        .collect();

    let columns = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for (_, cells) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = Vec::new();
    for (header, cells) in &rows {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map_or("", String::as_str);
                format!("{cell}{}", " ".repeat(width.saturating_sub(cell.width())))
            })
            .collect();
        out.push((*header, format!(" {} ", padded.join(" │ "))));
        if *header {
            let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            out.push((false, format!("─{}─", rule.join("─┼─"))));
        }
    }
    out
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_spans(child, InlineStyle::default(), None, &mut spans);
    }
    spans
}

fn collect_spans<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    link: Option<&str>,
    spans: &mut Vec<InlineSpan>,
) {
    let push = |spans: &mut Vec<InlineSpan>, text: String, style: InlineStyle| {
        let span = InlineSpan::new(text, style);
        spans.push(match link {
            Some(url) => span.with_link(url),
            None => span,
        });
    };

    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => {}
        NodeValue::Text(text) => push(spans, text.clone(), style),
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                ..style
            };
            push(spans, code.literal.clone(), code_style);
        }
        NodeValue::Emph => {
            let next = InlineStyle {
                emphasis: true,
                ..style
            };
            for child in node.children() {
                collect_spans(child, next, link, spans);
            }
        }
        NodeValue::Strong => {
            let next = InlineStyle {
                strong: true,
                ..style
            };
            for child in node.children() {
                collect_spans(child, next, link, spans);
            }
        }
        NodeValue::Strikethrough => {
            let next = InlineStyle {
                strikethrough: true,
                ..style
            };
            for child in node.children() {
                collect_spans(child, next, link, spans);
            }
        }
        NodeValue::Link(target) => {
            for child in node.children() {
                collect_spans(child, style, Some(&target.url), spans);
            }
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            push(spans, format!("[Image: {label}]"), style);
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => push(spans, " ".to_string(), style),
        _ => {
            for child in node.children() {
                collect_spans(child, style, link, spans);
            }
        }
    }
}

fn start_line(prefix: &str) -> Vec<InlineSpan> {
    if prefix.is_empty() {
        Vec::new()
    } else {
        vec![InlineSpan::plain(prefix)]
    }
}

fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    first_prefix: &str,
    next_prefix: &str,
) -> Vec<Vec<InlineSpan>> {
    let mut lines = Vec::new();
    let mut current = start_line(first_prefix);
    let mut current_width = first_prefix.width();
    let mut has_word = false;

    for token in spans.iter().flat_map(split_tokens) {
        let token_width = token.width();
        let is_whitespace = token.text().chars().all(char::is_whitespace);

        if has_word && current_width.saturating_add(token_width) > width {
            lines.push(std::mem::replace(&mut current, start_line(next_prefix)));
            current_width = next_prefix.width();
            has_word = false;
        }

        // Drop leading whitespace at wrapped line starts.
        if is_whitespace && !has_word {
            continue;
        }

        current_width = current_width.saturating_add(token_width);
        current.push(token);
        has_word = true;
    }

    lines.push(current);
    lines
}

fn split_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_whitespace: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if in_whitespace.is_some_and(|state| state != is_ws) {
            out.push(span.restyled(std::mem::take(&mut buf)));
        }
        buf.push(ch);
        in_whitespace = Some(is_ws);
    }

    if !buf.is_empty() {
        out.push(span.restyled(buf));
    }
    out
}

fn truncate_spans(spans: &[InlineSpan], max_width: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let mut taken = String::new();
        for ch in span.text().chars() {
            let width = ch.width().unwrap_or(0);
            if width > remaining {
                remaining = 0;
                break;
            }
            remaining -= width;
            taken.push(ch);
        }
        if !taken.is_empty() {
            out.push(span.restyled(taken));
        }
    }
    out
}
