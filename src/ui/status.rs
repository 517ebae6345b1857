use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model
        .document_path
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());

    let percent = model.viewport.scroll_percent();
    let offset_info = format!(
        "{}/{} px",
        model.viewport.offset(),
        model.viewport.content_height()
    );
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let link_info = model
        .link_log
        .last_line()
        .map_or_else(String::new, |line| format!("  {line}"));

    let status = format!(" {filename}  [{percent}%]  {offset_info}{watch_indicator}{link_info}  ?:help");

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}
