//! Style options applied to a single content block.
//!
//! A [`StyleConfig`] is built once through [`StyleBuilder`] and never
//! changes afterwards; each demo variation owns its own instance.

use thiserror::Error;

use crate::layout::Padding;

/// RGBA colour with components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// Horizontal alignment of wrapped lines inside a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Halign {
    #[default]
    Left,
    Center,
    Right,
    /// Rendered flush left; only the wrap width is shared with `Left`.
    Justify,
}

impl Halign {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// Rejected style values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("font name must not be empty")]
    EmptyFontName,
    #[error("font size must be positive, got {0}")]
    FontSize(f32),
    #[error("line height must be positive, got {0}")]
    LineHeight(f32),
    #[error("{field} component {value} is outside 0..=1")]
    Color { field: &'static str, value: f32 },
    #[error("padding must be non-negative, got {0}")]
    Padding(f32),
}

/// Immutable style for one content block.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    font_name: String,
    font_size: f32,
    color: Rgba,
    line_height: f32,
    halign: Halign,
    /// left, top, right, bottom
    padding: [f32; 4],
    disabled: bool,
    disabled_color: Rgba,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: "Roboto".to_string(),
            font_size: 15.0,
            color: [1.0, 1.0, 1.0, 1.0],
            line_height: 1.0,
            halign: Halign::Left,
            padding: [0.0; 4],
            disabled: false,
            disabled_color: [1.0, 1.0, 1.0, 0.3],
        }
    }
}

impl StyleConfig {
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub const fn font_size(&self) -> f32 {
        self.font_size
    }

    pub const fn color(&self) -> Rgba {
        self.color
    }

    pub const fn line_height(&self) -> f32 {
        self.line_height
    }

    pub const fn halign(&self) -> Halign {
        self.halign
    }

    pub const fn padding(&self) -> [f32; 4] {
        self.padding
    }

    pub const fn disabled(&self) -> bool {
        self.disabled
    }

    pub const fn disabled_color(&self) -> Rgba {
        self.disabled_color
    }

    /// Colour text is actually drawn with.
    pub const fn effective_color(&self) -> Rgba {
        if self.disabled {
            self.disabled_color
        } else {
            self.color
        }
    }

    /// Padding rounded up to whole layout pixels.
    pub fn padding_px(&self) -> Padding {
        let [left, top, right, bottom] = self.padding.map(ceil_px);
        Padding::new(left, top, right, bottom)
    }
}

/// Consuming builder for [`StyleConfig`].
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    config: StyleConfig,
}

impl StyleBuilder {
    #[must_use]
    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.config.font_name = name.into();
        self
    }

    #[must_use]
    pub const fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size;
        self
    }

    #[must_use]
    pub const fn color(mut self, color: Rgba) -> Self {
        self.config.color = color;
        self
    }

    #[must_use]
    pub const fn line_height(mut self, line_height: f32) -> Self {
        self.config.line_height = line_height;
        self
    }

    #[must_use]
    pub const fn halign(mut self, halign: Halign) -> Self {
        self.config.halign = halign;
        self
    }

    /// Padding as `[left, top, right, bottom]`.
    #[must_use]
    pub const fn padding(mut self, padding: [f32; 4]) -> Self {
        self.config.padding = padding;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    #[must_use]
    pub const fn disabled_color(mut self, color: Rgba) -> Self {
        self.config.disabled_color = color;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    /// Returns [`StyleError`] for an empty font name, a non-positive font
    /// size or line height, a colour component outside `0..=1`, or negative
    /// padding.
    pub fn build(self) -> Result<StyleConfig, StyleError> {
        let config = self.config;
        if config.font_name.trim().is_empty() {
            return Err(StyleError::EmptyFontName);
        }
        if !(config.font_size > 0.0 && config.font_size.is_finite()) {
            return Err(StyleError::FontSize(config.font_size));
        }
        if !(config.line_height > 0.0 && config.line_height.is_finite()) {
            return Err(StyleError::LineHeight(config.line_height));
        }
        check_color("color", config.color)?;
        check_color("disabled_color", config.disabled_color)?;
        if let Some(&bad) = config
            .padding
            .iter()
            .find(|p| !(**p >= 0.0 && p.is_finite()))
        {
            return Err(StyleError::Padding(bad));
        }
        Ok(config)
    }
}

fn check_color(field: &'static str, color: Rgba) -> Result<(), StyleError> {
    match color.iter().find(|c| !(0.0..=1.0).contains(*c)) {
        Some(&value) => Err(StyleError::Color { field, value }),
        None => Ok(()),
    }
}

// Style values are small, validated, non-negative floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn ceil_px(value: f32) -> u32 {
    value.max(0.0).ceil() as u32
}
