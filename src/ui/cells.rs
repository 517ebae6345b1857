//! Pixel to cell projection.
//!
//! Every label and every block line inside the window becomes one
//! [`CellRun`]: a row segment starting at the cell its top-left pixel
//! projects to. Painting and click handling both go through the same runs,
//! so a clicked cell always maps back onto the text painted there.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::{PX_PER_COL, PX_PER_ROW};
use crate::layout::{NodeId, Placement};
use crate::viewport::ScrollViewport;

/// What a run paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunContent {
    Label,
    /// Index into the block's visual lines.
    Line(usize),
}

/// One painted row segment, in cells relative to the document area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRun {
    pub node: NodeId,
    pub content: RunContent,
    pub row: u16,
    pub col: u16,
    /// Columns available before the node's right edge or the area edge.
    pub width: u16,
    /// Top-left of the run in document pixels.
    pub x: u32,
    pub y: u32,
    /// Right edge of the owning node in document pixels.
    pub right: u32,
}

impl CellRun {
    pub const fn contains_col(&self, col: u16) -> bool {
        col >= self.col && col < self.col.saturating_add(self.width)
    }
}

/// Runs for everything visible in `area`, in paint order.
///
/// A run starting above the scroll offset is skipped, as is a block line
/// projecting onto the row already taken by the previous line of the same
/// block.
pub fn cell_runs(viewport: &ScrollViewport, area: Rect) -> Vec<CellRun> {
    let tree = viewport.tree();
    let offset = viewport.offset();
    let mut runs = Vec::new();

    for placement in viewport.placements() {
        if tree.label_of(placement.node).is_some() {
            if let Some(run) = project(&placement, RunContent::Label, placement.x, placement.y, offset, area) {
                runs.push(run);
            }
            continue;
        }
        let Some(block) = tree.block_of(placement.node) else {
            continue;
        };
        let mut last_row = None;
        for (index, line) in block.lines().iter().enumerate() {
            let x = placement.x.saturating_add(line.x());
            let y = placement.y.saturating_add(line.y());
            let Some(run) = project(&placement, RunContent::Line(index), x, y, offset, area) else {
                continue;
            };
            if last_row == Some(run.row) {
                continue;
            }
            last_row = Some(run.row);
            runs.push(run);
        }
    }
    runs
}

fn project(
    placement: &Placement,
    content: RunContent,
    x: u32,
    y: u32,
    offset: u32,
    area: Rect,
) -> Option<CellRun> {
    let row = u16::try_from(y.checked_sub(offset)? / PX_PER_ROW).ok()?;
    if row >= area.height {
        return None;
    }
    let right = placement.x.saturating_add(placement.width);
    let col = u16::try_from(x / PX_PER_COL).ok()?;
    let right_col = u16::try_from(right / PX_PER_COL)
        .unwrap_or(u16::MAX)
        .min(area.width);
    if col >= right_col {
        return None;
    }
    Some(CellRun {
        node: placement.node,
        content,
        row,
        col,
        width: right_col - col,
        x,
        y,
        right,
    })
}

/// Window-relative pixel point under the terminal cell `(column, row)`.
///
/// On a block line the point lands in the middle of the glyph painted in
/// that cell, so [`ScrollViewport::activate_at`] resolves the same link
/// the user sees.
pub fn point_at_cell(
    viewport: &ScrollViewport,
    area: Rect,
    column: u16,
    row: u16,
) -> Option<(u32, u32)> {
    if !area.contains(ratatui::layout::Position::new(column, row)) {
        return None;
    }
    let rel_col = column - area.x;
    let rel_row = row - area.y;
    let run = cell_runs(viewport, area)
        .into_iter()
        .find(|run| run.row == rel_row && run.contains_col(rel_col))?;
    let cells_in = u32::from(rel_col - run.col);
    let y = run.y - viewport.offset();

    let x = match run.content {
        RunContent::Label => run.x + cells_in * PX_PER_COL,
        RunContent::Line(index) => {
            let line = viewport.tree().block_of(run.node)?.lines().get(index)?;
            // Beyond the painted text there is nothing to hit but padding.
            if cells_in as usize >= line.text().width() {
                return Some((run.right.saturating_sub(1), y));
            }
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let within = ((cells_in as f32 + 0.5) * line.advance()) as u32;
            run.x + within
        }
    };
    Some((x.min(run.right.saturating_sub(1)), y))
}
