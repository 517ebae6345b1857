//! Terminal UI components.
//!
//! This module paints the visible slice of the document into a ratatui
//! frame. Layout happens in pixels; painting projects pixels onto cells:
//! - [`cells`]: pixel to cell projection, shared by painting and clicks
//! - [`style`]: colors and modifiers for lines, spans and labels

pub mod cells;
pub mod style;

mod overlays;
mod render;
mod status;

pub use cells::{CellRun, RunContent, cell_runs, point_at_cell};
pub use render::{document_area, render};

/// Horizontal pixels covered by one terminal column.
pub const PX_PER_COL: u32 = 8;
/// Vertical pixels covered by one terminal row.
pub const PX_PER_ROW: u32 = 15;

/// Pixel size of a terminal area of `cols` x `rows` cells.
pub const fn pixels_for_cells(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32 * PX_PER_COL, rows as u32 * PX_PER_ROW)
}
