use ratatui::layout::Rect;

use crate::app::Model;
use crate::ui::{PX_PER_ROW, document_area, pixels_for_cells, point_at_cell};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n terminal rows
    ScrollUp(u32),
    /// Scroll down by n terminal rows
    ScrollDown(u32),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,
    /// Go to percentage through document
    GoToPercent(u8),
    NextSection,
    PrevSection,

    // Links
    /// Activate the link painted at terminal cell (column, row)
    ActivateAt(u16, u16),

    // System
    /// Terminal resized to (columns, rows)
    Resize(u16, u16),
    /// Re-read the canonical document from disk
    Reload,
    /// Replace the full-document cell's text
    ReloadDocument(String),
    ToggleHelp,
    HideHelp,
    Quit,
}

fn rows_to_px(rows: u32) -> i64 {
    i64::from(rows) * i64::from(PX_PER_ROW)
}

/// Apply one message to the model.
pub fn update(model: &mut Model, msg: Message) {
    match msg {
        Message::ScrollUp(n) => model.viewport.scroll_by(-rows_to_px(n)),
        Message::ScrollDown(n) => model.viewport.scroll_by(rows_to_px(n)),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::HalfPageUp => model.viewport.half_page_up(),
        Message::HalfPageDown => model.viewport.half_page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => model.viewport.go_to_bottom(),
        Message::GoToPercent(percent) => model.viewport.go_to_percent(percent),
        Message::NextSection => model.viewport.next_section(),
        Message::PrevSection => model.viewport.prev_section(),

        Message::ActivateAt(column, row) => {
            let (cols, rows) = model.terminal_size;
            let area = document_area(Rect::new(0, 0, cols, rows));
            let Some((x, y)) = point_at_cell(&model.viewport, area, column, row) else {
                return;
            };
            if let Some(activation) = model.viewport.activate_at(x, y) {
                tracing::debug!(block = %activation.block, reference = %activation.reference, "link activated");
                model.last_activation = Some(activation);
            }
        }

        Message::Resize(cols, rows) => {
            model.terminal_size = (cols, rows);
            if model.follow_terminal {
                let (width, height) = pixels_for_cells(cols, rows.saturating_sub(1));
                model.viewport.resize(width, height);
            }
        }
        Message::Reload => {
            let text = model.read_document();
            update(model, Message::ReloadDocument(text));
        }
        Message::ReloadDocument(text) => {
            if let Err(err) = model.reload_full_document(text) {
                tracing::warn!(error = %err, "failed to reload document");
            }
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => model.should_quit = true,
    }
}
