//! Advance-width metrics for the standard PDF fonts the report uses.
//!
//! Values come from the Adobe AFM files, in 1/1000ths of the font size,
//! covering the printable ASCII range (32..=126). Characters outside that
//! range fall back to a representative default width; the report body is
//! overwhelmingly ASCII, and a slightly-off measurement only makes a line
//! wrap a little early.

/// Width table for one font face.
pub struct StandardFontMetrics {
    /// Advance widths for chars 32..=126, in 1/1000 em.
    widths: &'static [u16; 95],
    /// Fallback advance for anything outside the table.
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance width of a single character in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match ch {
            ' '..='~' => self.widths[ch as usize - 32],
            _ => self.default_width,
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
        278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
        584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
        500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
        667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
        278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
        278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
    ],
    default_width: 556,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
        278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
        584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
        556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
        667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
        333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
        333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
    ],
    default_width: 611,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_width() {
        // Helvetica space is 278/1000 em: 3.336pt at 12pt.
        let w = HELVETICA.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = HELVETICA.measure_string("Observations", 11.0);
        let bold = HELVETICA_BOLD.measure_string("Observations", 11.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_measure_scales_linearly() {
        let at_10 = HELVETICA.measure_string("abc", 10.0);
        let at_20 = HELVETICA.measure_string("abc", 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-9);
    }

    #[test]
    fn test_non_ascii_uses_default() {
        let w = HELVETICA.char_width('é', 10.0);
        assert!((w - 5.56).abs() < 0.001);
    }
}
