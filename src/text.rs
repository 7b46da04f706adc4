use crate::color::Color;
use crate::math::Dimensions;

/// Ply does not manage fonts. It is up to the user to assign a unique ID to
/// each font and make the [`FontMetrics`] provider understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub u16);

/// Vertical metrics of one line of a font at one size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub line_gap: f64,
}

impl LineMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent + self.line_gap
    }
}

/// The font/text-metrics collaborator. Text is opaque to the core beyond
/// what is needed for intrinsic sizing.
pub trait FontMetrics {
    /// Advance width of every `char` of `text`, in order.
    fn glyph_advances(&self, text: &str, font: FontId, font_size: f64) -> Vec<f64>;

    fn line_metrics(&self, font: FontId, font_size: f64) -> LineMetrics;
}

/// Configuration settings for text elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextConfig {
    /// The color of the text.
    pub color: Color,
    /// `None` fails the frame with `MissingRequiredResource`.
    pub font_id: Option<FontId>,
    /// The font size of the text.
    pub font_size: f64,
    /// Extra space between letters.
    pub letter_spacing: f64,
    /// Line height override. `0` uses the font's own line metrics.
    pub line_height: f64,
}

impl TextConfig {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the text color.
    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.color = color.into();
        self
    }

    /// Sets the font ID.
    #[inline]
    pub fn font(&mut self, id: FontId) -> &mut Self {
        self.font_id = Some(id);
        self
    }

    /// Sets the font size.
    #[inline]
    pub fn font_size(&mut self, size: f64) -> &mut Self {
        self.font_size = size;
        self
    }

    /// Sets the letter spacing.
    #[inline]
    pub fn letter_spacing(&mut self, spacing: f64) -> &mut Self {
        self.letter_spacing = spacing;
        self
    }

    /// Sets the line height.
    #[inline]
    pub fn line_height(&mut self, height: f64) -> &mut Self {
        self.line_height = height;
        self
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.0, 0.0, 0.0),
            font_id: None,
            font_size: 16.0,
            letter_spacing: 0.0,
            line_height: 0.0,
        }
    }
}

/// Unwrapped size of `text`: the widest `\n`-separated line by the line count.
pub(crate) fn measure_text(
    metrics: &dyn FontMetrics,
    text: &str,
    font: FontId,
    config: &TextConfig,
) -> Dimensions {
    let line_height = if config.line_height > 0.0 {
        config.line_height
    } else {
        metrics.line_metrics(font, config.font_size).height()
    };

    let mut width: f64 = 0.0;
    let mut lines = 0usize;
    for line in text.split('\n') {
        lines += 1;
        let advances = metrics.glyph_advances(line, font, config.font_size);
        let spacing = advances.len().saturating_sub(1) as f64 * config.letter_spacing;
        width = width.max(advances.iter().sum::<f64>() + spacing);
    }
    Dimensions::new(width.max(0.0), lines as f64 * line_height)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Every glyph advances `font_size / 2`; lines are `font_size` tall.
    pub(crate) struct MonospaceMetrics;

    impl FontMetrics for MonospaceMetrics {
        fn glyph_advances(&self, text: &str, _font: FontId, font_size: f64) -> Vec<f64> {
            text.chars().map(|_| font_size / 2.0).collect()
        }

        fn line_metrics(&self, _font: FontId, font_size: f64) -> LineMetrics {
            LineMetrics {
                ascent: font_size * 0.8,
                descent: font_size * 0.2,
                line_gap: 0.0,
            }
        }
    }
}
