//! Colors and modifiers.
//!
//! Block text takes its foreground from the block's style configuration;
//! line types and inline spans only add modifiers on top of it, so the
//! color variations stay visible inside headings and lists.

use ratatui::style::{Color, Modifier, Style};

use crate::block::{InlineStyle, LineType};
use crate::layout::LabelRole;
use crate::style::{Rgba, StyleConfig};

/// Alpha below which a color is drawn dimmed.
const DIM_ALPHA: f32 = 0.5;

/// Terminal color for an RGBA quadruple in `0..=1`.
pub fn color_for_rgba(rgba: Rgba) -> Color {
    // Components are validated into 0..=1, so the product fits in u8
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(channel(rgba[0]), channel(rgba[1]), channel(rgba[2]))
}

/// Base style for a block's text.
pub fn style_for_block(config: &StyleConfig) -> Style {
    let color = config.effective_color();
    let style = Style::default().fg(color_for_rgba(color));
    if config.disabled() || color[3] < DIM_ALPHA {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

/// Section headers are gold, captions gray.
pub fn style_for_label(role: LabelRole) -> Style {
    match role {
        LabelRole::Header => Style::default()
            .fg(color_for_rgba([1.0, 0.8, 0.0, 1.0]))
            .add_modifier(Modifier::BOLD),
        LabelRole::Caption => Style::default().fg(color_for_rgba([0.7, 0.7, 0.7, 1.0])),
    }
}

/// Modifiers for a rendered line type, merged onto `base`.
pub fn style_for_line_type(base: Style, line_type: LineType) -> Style {
    match line_type {
        LineType::Heading(1) => base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(_) => base.add_modifier(Modifier::BOLD),
        LineType::CodeBlock | LineType::HorizontalRule => base.add_modifier(Modifier::DIM),
        LineType::BlockQuote => base.add_modifier(Modifier::ITALIC),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => base,
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let mut style = base;
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.fg(Color::LightBlue).add_modifier(Modifier::UNDERLINED);
    }
    if inline.code {
        style = style.bg(Color::Indexed(236));
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_maps_to_truecolor() {
        assert_eq!(color_for_rgba([1.0, 1.0, 0.0, 1.0]), Color::Rgb(255, 255, 0));
        assert_eq!(color_for_rgba([0.0, 1.0, 1.0, 1.0]), Color::Rgb(0, 255, 255));
    }

    #[test]
    fn test_disabled_block_is_dimmed() {
        let config = StyleConfig::builder().disabled(true).build().unwrap();
        let style = style_for_block(&config);
        assert!(style.add_modifier.contains(Modifier::DIM));
        assert_eq!(style.fg, Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_heading_keeps_block_color() {
        let base = Style::default().fg(Color::Rgb(0, 255, 255));
        let style = style_for_line_type(base, LineType::Heading(2));
        assert_eq!(style.fg, Some(Color::Rgb(0, 255, 255)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_inline_link_is_underlined() {
        let inline = InlineStyle {
            link: true,
            strong: true,
            ..InlineStyle::default()
        };
        let style = style_for_inline(Style::default(), inline);
        assert!(style.add_modifier.contains(Modifier::UNDERLINED | Modifier::BOLD));
        assert_eq!(style.fg, Some(Color::LightBlue));
    }

    #[test]
    fn test_labels_use_distinct_colors() {
        assert_ne!(
            style_for_label(LabelRole::Header).fg,
            style_for_label(LabelRole::Caption).fg
        );
    }
}
