use std::path::PathBuf;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tempfile::tempdir;

use crate::document::{Metrics, demo_catalog};
use crate::source::{CANONICAL_DOCUMENT, StaticSource};
use crate::ui::{RunContent, cell_runs, document_area};
use crate::viewport::ScrollViewport;

use super::event_loop::release_mouse;
use super::{Message, Model, input, update};

const TERMINAL: (u16, u16) = (175, 61);

fn create_test_model_with(document: &str, path: PathBuf) -> Model {
    let spec = demo_catalog().unwrap();
    let source = StaticSource::new().with(CANONICAL_DOCUMENT, document);
    let viewport =
        ScrollViewport::build(&spec, &Metrics::default(), &source, (1400, 900)).unwrap();
    Model::new(viewport, path, TERMINAL).unwrap()
}

fn create_test_model() -> Model {
    create_test_model_with(
        "# Doc\n\nSee [site](https://example.com) for more.",
        PathBuf::from(CANONICAL_DOCUMENT),
    )
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn full_document_text(model: &Model) -> String {
    let node = model.viewport.document().full_document_block().unwrap();
    model.viewport.tree().block_of(node).unwrap().text().to_string()
}

#[test]
fn test_scroll_down_moves_one_row_of_pixels() {
    let mut model = create_test_model();
    update(&mut model, Message::ScrollDown(1));
    assert_eq!(model.viewport.offset(), 15);
    update(&mut model, Message::ScrollUp(5));
    assert_eq!(model.viewport.offset(), 0);
}

#[test]
fn test_go_to_bottom_stops_at_scroll_range() {
    let mut model = create_test_model();
    update(&mut model, Message::GoToBottom);
    assert_eq!(model.viewport.offset(), model.viewport.scroll_range());
    update(&mut model, Message::PageDown);
    assert_eq!(model.viewport.offset(), model.viewport.scroll_range());
    update(&mut model, Message::GoToTop);
    assert_eq!(model.viewport.offset(), 0);
}

#[test]
fn test_quit_sets_flag() {
    let mut model = create_test_model();
    assert!(!model.should_quit);
    update(&mut model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_toggle_and_hide_help() {
    let mut model = create_test_model();
    update(&mut model, Message::ToggleHelp);
    assert!(model.help_visible);
    update(&mut model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_resize_follows_terminal_when_enabled() {
    let mut model = create_test_model();
    update(&mut model, Message::Resize(100, 41));
    assert_eq!(model.viewport.width(), 800);
    assert_eq!(model.viewport.height(), 600);
    assert_eq!(model.terminal_size, (100, 41));
}

#[test]
fn test_resize_keeps_fixed_viewport() {
    let mut model = create_test_model();
    model.follow_terminal = false;
    update(&mut model, Message::Resize(100, 41));
    assert_eq!(model.viewport.width(), 1400);
    assert_eq!(model.viewport.height(), 900);
    assert_eq!(model.terminal_size, (100, 41));
}

#[test]
fn test_reload_document_grows_and_clamps() {
    let mut model = create_test_model();
    let before = model.viewport.content_height();

    let long = "Paragraph.\n\n".repeat(40);
    update(&mut model, Message::ReloadDocument(long.clone()));
    assert_eq!(full_document_text(&model), long);
    assert!(model.viewport.content_height() > before);

    update(&mut model, Message::GoToBottom);
    let far = model.viewport.offset();
    update(&mut model, Message::ReloadDocument("Short.".to_string()));
    assert!(model.viewport.offset() < far);
    assert_eq!(model.viewport.offset(), model.viewport.scroll_range());
}

#[test]
fn test_reload_reads_document_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# First").unwrap();
    let mut model = create_test_model_with("# First", path.clone());

    std::fs::write(&path, "# Second\n\nUpdated body.").unwrap();
    update(&mut model, Message::Reload);
    assert_eq!(full_document_text(&model), "# Second\n\nUpdated body.");
}

#[test]
fn test_reload_of_missing_document_shows_fallback() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gone.md");
    let mut model = create_test_model_with("# Was here", path);
    update(&mut model, Message::Reload);
    assert_eq!(full_document_text(&model), crate::source::FALLBACK_TEXT);
}

#[test]
fn test_click_on_painted_link_prints_it() {
    let mut model = create_test_model();
    update(&mut model, Message::GoToBottom);

    let (cols, rows) = TERMINAL;
    let area = document_area(Rect::new(0, 0, cols, rows));
    let tree = model.viewport.tree();
    let (column, row) = cell_runs(&model.viewport, area)
        .into_iter()
        .find_map(|run| {
            let RunContent::Line(index) = run.content else {
                return None;
            };
            let line = tree.block_of(run.node)?.lines().get(index)?;
            let mut col = 0;
            for span in line.spans() {
                if span.link() == Some("https://example.com") {
                    return Some((run.col + u16::try_from(col).ok()?, run.row));
                }
                col += span.width();
            }
            None
        })
        .expect("link should be painted at the bottom of the document");

    update(&mut model, Message::ActivateAt(column, row));

    assert_eq!(
        model.link_log.last_line().as_deref(),
        Some("Link clicked: https://example.com")
    );
    assert_eq!(model.router.delivered(), 1);
    let activation = model.last_activation.as_ref().unwrap();
    assert_eq!(activation.reference, "https://example.com");
}

#[test]
fn test_click_on_plain_text_does_nothing() {
    let mut model = create_test_model();
    update(&mut model, Message::ActivateAt(3, 0));
    update(&mut model, Message::ActivateAt(174, 59));
    assert!(model.link_log.is_empty());
    assert!(model.last_activation.is_none());
}

#[test]
fn test_navigation_keys() {
    let model = create_test_model();
    assert_eq!(
        input::handle_key(key(KeyCode::Char('j')), &model),
        Some(Message::ScrollDown(1))
    );
    assert_eq!(input::handle_key(key(KeyCode::Char('k')), &model), None);
    assert_eq!(
        input::handle_key(key(KeyCode::Char(' ')), &model),
        Some(Message::PageDown)
    );
    assert_eq!(
        input::handle_key(key(KeyCode::PageUp), &model),
        Some(Message::PageUp)
    );
    assert_eq!(
        input::handle_key(key(KeyCode::Char('G')), &model),
        Some(Message::GoToBottom)
    );
    assert_eq!(
        input::handle_key(key(KeyCode::Char('g')), &model),
        Some(Message::GoToTop)
    );
    assert_eq!(
        input::handle_key(key(KeyCode::Esc), &model),
        Some(Message::Quit)
    );
}

#[test]
fn test_digit_keys_jump_to_percent() {
    let mut model = create_test_model();
    let msg = input::handle_key(key(KeyCode::Char('5')), &model).unwrap();
    assert_eq!(msg, Message::GoToPercent(50));
    update(&mut model, msg);
    assert_eq!(model.viewport.scroll_percent(), 50);
}

#[test]
fn test_scroll_down_key_ignored_at_bottom() {
    let mut model = create_test_model();
    update(&mut model, Message::GoToBottom);
    assert_eq!(input::handle_key(key(KeyCode::Down), &model), None);
    assert_eq!(
        input::handle_key(key(KeyCode::Up), &model),
        Some(Message::ScrollUp(1))
    );
}

#[test]
fn test_ctrl_keys() {
    let model = create_test_model();
    let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
    assert_eq!(input::handle_key(ctrl('c'), &model), Some(Message::Quit));
    assert_eq!(input::handle_key(ctrl('d'), &model), Some(Message::HalfPageDown));
    assert_eq!(input::handle_key(ctrl('u'), &model), Some(Message::HalfPageUp));
}

#[test]
fn test_any_key_closes_help() {
    let mut model = create_test_model();
    model.help_visible = true;
    assert_eq!(
        input::handle_key(key(KeyCode::Char('j')), &model),
        Some(Message::HideHelp)
    );
}

#[test]
fn test_mouse_events() {
    let model = create_test_model();
    let mouse = |kind| MouseEvent {
        kind,
        column: 12,
        row: 7,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(
        input::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left)), &model),
        Some(Message::ActivateAt(12, 7))
    );
    assert_eq!(
        input::handle_mouse(mouse(MouseEventKind::ScrollDown), &model),
        Some(Message::ScrollDown(3))
    );
    assert_eq!(input::handle_mouse(mouse(MouseEventKind::Moved), &model), None);
}

#[test]
fn test_resize_event_maps_to_message() {
    let model = create_test_model();
    assert_eq!(
        input::handle_event(&Event::Resize(90, 30), &model),
        Some(Message::Resize(90, 30))
    );
}

struct BrokenPipe;

impl std::io::Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }
}

#[test]
fn test_release_mouse_writes_disable_sequence() {
    let mut out = Vec::new();
    release_mouse(&mut out);
    let written = String::from_utf8(out).unwrap();
    assert!(written.contains("\x1b[?1000l"));
}

#[test]
fn test_release_mouse_tolerates_write_failure() {
    release_mouse(&mut BrokenPipe);
}
