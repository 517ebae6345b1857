//! The built-in demo: one section per style option.

use super::{DemoSpec, SectionSpec, VariationSpec};
use crate::style::{Halign, StyleBuilder, StyleConfig, StyleError};

/// Text shared by every style variation.
pub const SAMPLE_MARKDOWN: &str = "## Sample Heading\n\n\
This is a paragraph with some text to demonstrate the property. \
It includes `inline code` for testing code font preservation.\n\n\
Another paragraph to show line spacing effects.";

pub const WINDOW_TITLE: &str = "Markdown Block Demo - Label Compatibility";

/// Window and viewport size in pixels.
pub const WINDOW_SIZE: (u32, u32) = (1400, 900);

fn variation(caption: &str, style: StyleBuilder) -> Result<VariationSpec, StyleError> {
    Ok(VariationSpec::new(caption, style.build()?))
}

fn section(title: &str, variations: Vec<VariationSpec>) -> SectionSpec {
    variations
        .into_iter()
        .fold(SectionSpec::new(title), SectionSpec::with)
}

/// The full demo: `font_name`, `font_size`, `color`, `line_height`,
/// `halign`, `padding` and `disabled` variations of the sample text, then
/// the canonical document on its own.
///
/// # Errors
/// Returns [`StyleError`] if a catalog style is invalid.
pub fn demo_catalog() -> Result<DemoSpec, StyleError> {
    let base = StyleConfig::builder;

    Ok(DemoSpec::new(SAMPLE_MARKDOWN)
        .with_section(section(
            "font_name",
            vec![
                variation("font_name='Roboto' (default)", base().font_name("Roboto"))?,
                variation("font_name='DejaVuSans'", base().font_name("DejaVuSans"))?,
            ],
        ))
        .with_section(section(
            "font_size",
            vec![
                variation("font_size=14", base().font_size(14.0))?,
                variation("font_size=20", base().font_size(20.0))?,
                variation("font_size=28", base().font_size(28.0))?,
            ],
        ))
        .with_section(section(
            "color",
            vec![
                variation("color=[1,1,1,1] (white)", base().color([1.0, 1.0, 1.0, 1.0]))?,
                variation("color=[1,1,0,1] (yellow)", base().color([1.0, 1.0, 0.0, 1.0]))?,
                variation("color=[0,1,1,1] (cyan)", base().color([0.0, 1.0, 1.0, 1.0]))?,
            ],
        ))
        .with_section(section(
            "line_height",
            vec![
                variation("line_height=1.0", base().line_height(1.0))?,
                variation("line_height=1.5", base().line_height(1.5))?,
                variation("line_height=2.0", base().line_height(2.0))?,
            ],
        ))
        .with_section(section(
            "halign",
            [Halign::Left, Halign::Center, Halign::Right]
                .into_iter()
                .map(|halign| {
                    variation(&format!("halign='{}'", halign.as_str()), base().halign(halign))
                })
                .collect::<Result<_, _>>()?,
        ))
        .with_section(section(
            "padding",
            vec![
                variation("padding=[0,0,0,0] (default)", base())?,
                variation(
                    "padding=[20,10,20,10]",
                    base().padding([20.0, 10.0, 20.0, 10.0]),
                )?,
                variation(
                    "padding=[40,20,40,20]",
                    base().padding([40.0, 20.0, 40.0, 20.0]),
                )?,
            ],
        ))
        .with_section(section(
            "disabled",
            vec![
                variation("disabled=false", base().disabled(false))?,
                variation(
                    "disabled=true (disabled_color=[1,1,1,0.3])",
                    base().disabled(true),
                )?,
            ],
        ))
        .with_section(section(
            "sample_markdown.md",
            vec![VariationSpec::full_document(
                "Full sample_markdown.md",
                base().build()?,
            )],
        )))
}
