use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{Message, Model};

/// Lines scrolled per mouse wheel notch.
const WHEEL_ROWS: u32 = 3;

pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(*key, model),
        Event::Mouse(mouse) => handle_mouse(*mouse, model),
        Event::Resize(cols, rows) => Some(Message::Resize(*cols, *rows)),
        _ => None,
    }
}

pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    if model.help_visible {
        return None;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_ROWS)),
        MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_ROWS)),
        MouseEventKind::Down(MouseButton::Left) => {
            Some(Message::ActivateAt(mouse.column, mouse.row))
        }
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
        return Some(Message::Quit);
    }

    if model.help_visible {
        return Some(Message::HideHelp);
    }

    match key.code {
        KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
        KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
        KeyCode::Char('j') | KeyCode::Down => {
            model.viewport.can_scroll_down().then_some(Message::ScrollDown(1))
        }
        KeyCode::Char('k') | KeyCode::Up => {
            model.viewport.can_scroll_up().then_some(Message::ScrollUp(1))
        }
        KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
        KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).and_then(|d| u8::try_from(d).ok())?;
            Some(Message::GoToPercent(tenths * 10))
        }
        KeyCode::Char('n') => Some(Message::NextSection),
        KeyCode::Char('p') => Some(Message::PrevSection),
        KeyCode::Char('r') => Some(Message::Reload),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
        _ => None,
    }
}
