//! # Text Wrapping
//!
//! Splits a string into lines that fit a given width, using the font
//! metrics for measurement and UAX#14 for break opportunities. This is the
//! "measure and wrap" capability the layout engine leans on for every
//! labelled field.
//!
//! Greedy algorithm: walk the text segment by segment (a segment is the
//! unbreakable run between two break opportunities), appending segments to
//! the current line until one doesn't fit. Mandatory breaks (newlines) end
//! the line where they stand. A segment wider than the whole line is
//! hard-split at a character boundary, at least one character per line, so
//! pathological inputs still make progress.

use crate::font::{FontContext, StandardFont};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A single wrapped line and its measured width.
#[derive(Debug, Clone)]
pub struct BrokenLine {
    pub text: String,
    pub width: f64,
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width` points.
    ///
    /// Every returned line satisfies `measure(line.text) <= max_width`
    /// (trailing whitespace is trimmed before measuring). Empty input
    /// yields a single empty line so callers always have something to
    /// advance the cursor past.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font: StandardFont,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        if text.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
                width: 0.0,
            }];
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;
        let mut prev = 0;

        for (pos, opportunity) in linebreaks(text) {
            let segment = &text[prev..pos];
            prev = pos;

            self.append_segment(
                font_context,
                font,
                font_size,
                max_width,
                segment,
                &mut lines,
                &mut current,
                &mut current_width,
            );

            // The iterator always ends with a mandatory break at the end of
            // the text, which flushes whatever is left on the current line.
            if matches!(opportunity, BreakOpportunity::Mandatory) {
                flush(font_context, font, font_size, &mut current, &mut lines);
                current_width = 0.0;
            }
        }

        lines
    }

    /// Append one unbreakable segment to the current line, flushing and
    /// hard-splitting as needed.
    #[allow(clippy::too_many_arguments)]
    fn append_segment(
        &self,
        font_context: &FontContext,
        font: StandardFont,
        font_size: f64,
        max_width: f64,
        segment: &str,
        lines: &mut Vec<BrokenLine>,
        current: &mut String,
        current_width: &mut f64,
    ) {
        // Trailing whitespace never counts against the line it ends.
        let fit_width = font_context.measure_string(segment.trim_end(), font, font_size);

        if *current_width + fit_width <= max_width {
            current.push_str(segment);
            *current_width += font_context.measure_string(segment, font, font_size);
            return;
        }

        if !current.is_empty() {
            flush(font_context, font, font_size, current, lines);
            *current_width = 0.0;
        }

        if fit_width <= max_width {
            current.push_str(segment);
            *current_width = font_context.measure_string(segment, font, font_size);
            return;
        }

        // The segment alone overflows an empty line: split at character
        // boundaries, minimum one character per line. Trailing newlines are
        // dropped here (the mandatory-break flush handles them); interior
        // and trailing spaces stay so following segments keep their gap.
        let mut chunk = String::new();
        let mut chunk_width = 0.0;
        for ch in segment.trim_end_matches(['\n', '\r']).chars() {
            let ch_width = font_context.char_width(ch, font, font_size);
            if !chunk.is_empty() && chunk_width + ch_width > max_width {
                lines.push(BrokenLine {
                    text: std::mem::take(&mut chunk),
                    width: chunk_width,
                });
                chunk_width = 0.0;
            }
            chunk.push(ch);
            chunk_width += ch_width;
        }
        *current = chunk;
        *current_width = chunk_width;
    }
}

fn flush(
    font_context: &FontContext,
    font: StandardFont,
    font_size: f64,
    current: &mut String,
    lines: &mut Vec<BrokenLine>,
) {
    let text = current.trim_end().to_string();
    let width = font_context.measure_string(&text, font, font_size);
    lines.push(BrokenLine { text, width });
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, max_width: f64) -> Vec<BrokenLine> {
        let ctx = FontContext::new();
        TextLayout::new().break_into_lines(&ctx, text, max_width, StandardFont::Helvetica, 11.0)
    }

    #[test]
    fn test_empty_yields_single_empty_line() {
        let lines = wrap("", 200.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.is_empty());
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        let lines = wrap("hello world", 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "hello world");
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        let lines = wrap("alpha beta gamma delta epsilon zeta eta theta", 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.text.starts_with(' '));
            assert!(!line.text.ends_with(' '));
        }
    }

    #[test]
    fn test_every_line_fits() {
        let ctx = FontContext::new();
        let text = "The quick brown fox jumps over the lazy dog, again and \
                    again, until the page runs out of horizontal room entirely.";
        for max_width in [60.0, 120.0, 515.28] {
            let lines = wrap(text, max_width);
            for line in &lines {
                let measured =
                    ctx.measure_string(&line.text, StandardFont::Helvetica, 11.0);
                assert!(
                    measured <= max_width + 1e-9,
                    "line '{}' measures {measured} > {max_width}",
                    line.text
                );
            }
        }
    }

    #[test]
    fn test_newline_forces_break() {
        let lines = wrap("first\nsecond", 500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_blank_line_preserved() {
        let lines = wrap("first\n\nthird", 500.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].text.is_empty());
    }

    #[test]
    fn test_overlong_word_hard_splits() {
        let lines = wrap(&"x".repeat(400), 100.0);
        assert!(lines.len() > 1);
        let ctx = FontContext::new();
        for line in &lines {
            assert!(!line.text.is_empty());
            let measured = ctx.measure_string(&line.text, StandardFont::Helvetica, 11.0);
            assert!(measured <= 100.0 + 1e-9);
        }
        let total: usize = lines.iter().map(|l| l.text.chars().count()).sum();
        assert_eq!(total, 400, "hard split must not drop characters");
    }

    #[test]
    fn test_tiny_width_still_progresses() {
        // Narrower than a single character: one char per line, no hang.
        let lines = wrap("wide", 1.0);
        assert_eq!(lines.len(), 4);
    }
}
