//! # Font Management
//!
//! The report is typeset in the standard PDF Helvetica faces, which every
//! reader ships and which need no embedding. Two faces are enough: regular
//! for body text and titles, bold for field labels.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts the report draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The /BaseFont name for the PDF font dictionary.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Shared measurement context used by layout and PDF serialization.
///
/// This is the seam the layout engine measures text through; it never
/// touches width tables directly.
pub struct FontContext;

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().char_width(ch, font_size)
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_matches_metrics() {
        let ctx = FontContext::new();
        let direct = StandardFont::Helvetica.metrics().measure_string("Hello", 12.0);
        let via_ctx = ctx.measure_string("Hello", StandardFont::Helvetica, 12.0);
        assert!((direct - via_ctx).abs() < 1e-9);
    }

    #[test]
    fn test_pdf_names() {
        assert_eq!(StandardFont::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.pdf_name(), "Helvetica-Bold");
    }
}
