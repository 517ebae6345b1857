use ratatui::prelude::*;

use crate::app::Model;
use crate::layout::LayoutTree;

use super::cells::{CellRun, RunContent, cell_runs};
use super::{overlays, status, style};

/// Everything above the status bar.
pub fn document_area(area: Rect) -> Rect {
    Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1))
}

fn status_area(area: Rect) -> Rect {
    Rect::new(
        area.x,
        area.y + area.height.saturating_sub(1),
        area.width,
        area.height.min(1),
    )
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let _scope = crate::perf::scope("ui.render");
    let area = frame.area();

    render_document(model, frame, document_area(area));
    status::render_status_bar(model, frame, status_area(area));

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let tree = model.viewport.tree();
    let runs = cell_runs(&model.viewport, area);
    crate::perf::log_event(
        "ui.render_document",
        format!(
            "area={}x{} offset={} runs={}",
            area.width,
            area.height,
            model.viewport.offset(),
            runs.len()
        ),
    );

    let buf = frame.buffer_mut();
    for run in runs {
        paint_run(tree, buf, area, &run);
    }
}

fn paint_run(tree: &LayoutTree, buf: &mut Buffer, area: Rect, run: &CellRun) {
    let x = area.x + run.col;
    let y = area.y + run.row;
    let max = usize::from(run.width);

    match run.content {
        RunContent::Label => {
            if let Some(label) = tree.label_of(run.node) {
                buf.set_stringn(x, y, label.text(), max, style::style_for_label(label.role()));
            }
        }
        RunContent::Line(index) => {
            let Some(block) = tree.block_of(run.node) else {
                return;
            };
            let Some(line) = block.lines().get(index) else {
                return;
            };
            let base = style::style_for_line_type(
                style::style_for_block(block.style()),
                line.line_type(),
            );
            let end = x.saturating_add(run.width);
            let mut col = x;
            for span in line.spans() {
                if col >= end {
                    break;
                }
                let (next, _) = buf.set_stringn(
                    col,
                    y,
                    span.text(),
                    usize::from(end - col),
                    style::style_for_inline(base, span.style()),
                );
                col = next;
            }
        }
    }
}
