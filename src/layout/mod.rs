//! # Page-Aware Flow Layout
//!
//! The heart of the exporter. Scenarios flow onto pages top to bottom
//! against a running cursor, and every atomic drawing unit — a title line,
//! a label, a chunk of wrapped text, an image — first asks whether it fits
//! in the space left on the page. If not, the page is closed and the cursor
//! starts fresh at the top margin of a new one.
//!
//! Three block shapes cover the whole report:
//!
//! 1. **Title** — one line at the display size.
//! 2. **Labelled field** — a bold label, a blank-line gap, then the value
//!    word-wrapped to the usable width. The wrapped lines are chunked by
//!    how many fit in the remaining vertical space (`floor(remaining /
//!    line_height)`, never fewer than one per chunk so progress is
//!    guaranteed), continuing page after page until exhausted.
//! 3. **Gallery** — a header, then images placed vertically, each scaled
//!    down (never up) to fit the usable width and a height cap.
//!
//! Every scenario after the first starts on a fresh page regardless of the
//! space left, so scenarios never share a page boundary.
//!
//! The cursor is owned by the layout call and threaded explicitly through
//! the block helpers; two concurrent exports cannot see each other.

use log::warn;

use crate::font::{FontContext, StandardFont};
use crate::image_loader::{load_image, LoadedImage};
use crate::model::{AppType, PageSpec, Report, Scenario};
use crate::text::TextLayout;

/// Title text when the scenario has no application name.
const DEFAULT_TITLE: &str = "Evidence Collector";
/// What an empty text field renders as.
const EMPTY_PLACEHOLDER: &str = "-";

const TITLE_FONT_SIZE: f64 = 18.0;
/// Vertical space reserved before a title is placed.
const TITLE_RESERVE: f64 = 30.0;
/// Cursor advance after a title.
const TITLE_ADVANCE: f64 = 28.0;

const LABEL_FONT_SIZE: f64 = 12.0;
const BODY_FONT_SIZE: f64 = 11.0;
/// Baseline-to-baseline distance for body text.
const LINE_HEIGHT: f64 = 14.0;
/// Extra advance after a label line.
const LABEL_GAP: f64 = 8.0;
/// Blank-line gap between a label and its value.
const VALUE_GAP: f64 = 4.0;
/// Advance after each chunk of wrapped value lines.
const CHUNK_GAP: f64 = 6.0;
/// Trailing advance after a whole labelled field.
const FIELD_GAP: f64 = 10.0;

const GALLERY_FONT_SIZE: f64 = 13.0;
/// Vertical space reserved before a gallery header.
const GALLERY_RESERVE: f64 = 20.0;
/// Cursor advance after a gallery header.
const GALLERY_ADVANCE: f64 = 18.0;
/// Space reserved below an image when testing whether it fits.
const IMAGE_RESERVE: f64 = 8.0;
/// Cursor advance between images in a gallery.
const IMAGE_GAP: f64 = 12.0;
/// Trailing advance after a gallery.
const GALLERY_TRAILING_GAP: f64 = 6.0;
/// Subtracted from the content height to cap image heights, leaving room
/// below a full-height screenshot.
const IMAGE_BOTTOM_RESERVE: f64 = 60.0;

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// One drawing instruction on a page. Ops are emitted in strict scenario
/// order and drawn in emission order; nothing reorders or deduplicates.
#[derive(Debug)]
pub enum DrawOp {
    /// One or more lines of text in a single font and size.
    Text {
        font: StandardFont,
        size: f64,
        lines: Vec<PlacedLine>,
    },
    /// An image placed with its top-left corner at (x, y).
    Image {
        image: LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// A positioned line of text. `y` is the baseline, measured from the top
/// of the page like every other coordinate here.
#[derive(Debug, Clone)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Tracks where we are on the current page during layout.
struct PageCursor {
    width: f64,
    height: f64,
    margin: f64,
    y: f64,
    ops: Vec<DrawOp>,
}

impl PageCursor {
    fn new(spec: &PageSpec) -> Self {
        let (width, height) = spec.size.dimensions();
        Self {
            width,
            height,
            margin: spec.margin,
            y: spec.margin,
            ops: Vec::new(),
        }
    }

    fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// The lowest y any content may reach.
    fn limit(&self) -> f64 {
        self.height - self.margin
    }

    /// Close the current page onto `pages` and reset to the top margin.
    fn break_page(&mut self, pages: &mut Vec<LayoutPage>) {
        pages.push(LayoutPage {
            width: self.width,
            height: self.height,
            ops: std::mem::take(&mut self.ops),
        });
        self.y = self.margin;
    }

    /// The page-break test: break before drawing if a block of height
    /// `needed` would cross the bottom margin.
    fn ensure_space(&mut self, needed: f64, pages: &mut Vec<LayoutPage>) {
        if self.y + needed > self.limit() {
            self.break_page(pages);
        }
    }
}

/// The layout engine. Holds no per-export state; everything mutable lives
/// in the `PageCursor` local to each `layout` call.
pub struct LayoutEngine {
    text_layout: TextLayout,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            text_layout: TextLayout::new(),
        }
    }

    /// Lay out a whole report into pages.
    pub fn layout(&self, report: &Report, font_context: &FontContext) -> Vec<LayoutPage> {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(&report.page);

        for (index, scenario) in report.scenarios.iter().enumerate() {
            self.layout_scenario(scenario, &mut cursor, &mut pages, font_context);

            // Scenario separator: every scenario starts on a fresh page.
            if index + 1 < report.scenarios.len() {
                cursor.break_page(&mut pages);
            }
        }

        cursor.break_page(&mut pages);
        pages
    }

    fn layout_scenario(
        &self,
        scenario: &Scenario,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        font_context: &FontContext,
    ) {
        let title = if scenario.application_name.is_empty() {
            DEFAULT_TITLE
        } else {
            scenario.application_name.as_str()
        };
        self.add_title(title, cursor, pages);

        self.add_label_value("Application type", scenario.app_type.as_str(), cursor, pages, font_context);
        self.add_label_value("URL", &scenario.url, cursor, pages, font_context);
        self.add_label_value("Scenario title", &scenario.title, cursor, pages, font_context);
        self.add_label_value("Scenario description", &scenario.description, cursor, pages, font_context);

        match scenario.app_type {
            AppType::Frontend => {
                self.add_gallery("Screenshots - Before", &scenario.screenshots_before, cursor, pages);
                self.add_gallery("Screenshots - After", &scenario.screenshots_after, cursor, pages);
            }
            AppType::Backend => {
                self.add_label_value("Request body", &scenario.request_body, cursor, pages, font_context);
                self.add_label_value("Response body", &scenario.response_body, cursor, pages, font_context);
            }
        }

        self.add_label_value("Observations", &scenario.observations, cursor, pages, font_context);
    }

    /// The scenario heading: a single unwrapped line at the display size.
    fn add_title(&self, text: &str, cursor: &mut PageCursor, pages: &mut Vec<LayoutPage>) {
        cursor.ensure_space(TITLE_RESERVE, pages);
        let line = PlacedLine {
            text: text.to_string(),
            x: cursor.margin,
            y: cursor.y,
        };
        cursor.ops.push(DrawOp::Text {
            font: StandardFont::Helvetica,
            size: TITLE_FONT_SIZE,
            lines: vec![line],
        });
        cursor.y += TITLE_ADVANCE;
    }

    /// A bold label followed by its word-wrapped value, split across pages
    /// at line boundaries when the remaining space runs out.
    fn add_label_value(
        &self,
        label: &str,
        value: &str,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        font_context: &FontContext,
    ) {
        cursor.ensure_space(LINE_HEIGHT + LABEL_GAP, pages);
        let line = PlacedLine {
            text: label.to_string(),
            x: cursor.margin,
            y: cursor.y,
        };
        cursor.ops.push(DrawOp::Text {
            font: StandardFont::HelveticaBold,
            size: LABEL_FONT_SIZE,
            lines: vec![line],
        });
        cursor.y += LINE_HEIGHT + LABEL_GAP;
        cursor.y += VALUE_GAP;

        let text = if value.is_empty() { EMPTY_PLACEHOLDER } else { value };
        let lines = self.text_layout.break_into_lines(
            font_context,
            text,
            cursor.usable_width(),
            StandardFont::Helvetica,
            BODY_FONT_SIZE,
        );

        let mut next = 0;
        while next < lines.len() {
            if cursor.y + LINE_HEIGHT > cursor.limit() {
                cursor.break_page(pages);
            }
            let fitting = ((cursor.limit() - cursor.y) / LINE_HEIGHT).floor() as usize;
            let take = fitting.max(1).min(lines.len() - next);

            let placed = lines[next..next + take]
                .iter()
                .enumerate()
                .map(|(row, line)| PlacedLine {
                    text: line.text.clone(),
                    x: cursor.margin,
                    y: cursor.y + row as f64 * LINE_HEIGHT,
                })
                .collect();
            cursor.ops.push(DrawOp::Text {
                font: StandardFont::Helvetica,
                size: BODY_FONT_SIZE,
                lines: placed,
            });

            cursor.y += take as f64 * LINE_HEIGHT + CHUNK_GAP;
            next += take;
        }

        cursor.y += FIELD_GAP;
    }

    /// A titled vertical run of images. An empty gallery draws nothing,
    /// header included. A source that fails to resolve or decode is logged
    /// and skipped; the rest of the gallery continues.
    fn add_gallery(
        &self,
        header: &str,
        sources: &[String],
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
    ) {
        if sources.is_empty() {
            return;
        }

        cursor.ensure_space(GALLERY_RESERVE, pages);
        let line = PlacedLine {
            text: header.to_string(),
            x: cursor.margin,
            y: cursor.y,
        };
        cursor.ops.push(DrawOp::Text {
            font: StandardFont::Helvetica,
            size: GALLERY_FONT_SIZE,
            lines: vec![line],
        });
        cursor.y += GALLERY_ADVANCE;

        for source in sources {
            let image = match load_image(source) {
                Ok(image) => image,
                Err(err) => {
                    warn!("skipping screenshot in '{header}': {err}");
                    continue;
                }
            };

            let max_height = cursor.height - cursor.margin - IMAGE_BOTTOM_RESERVE;
            let scale = (cursor.usable_width() / image.width_px as f64)
                .min(max_height / image.height_px as f64)
                .min(1.0);
            let draw_width = image.width_px as f64 * scale;
            let draw_height = image.height_px as f64 * scale;

            cursor.ensure_space(draw_height + IMAGE_RESERVE, pages);
            let (x, y) = (cursor.margin, cursor.y);
            cursor.ops.push(DrawOp::Image {
                image,
                x,
                y,
                width: draw_width,
                height: draw_height,
            });
            cursor.y += draw_height + IMAGE_GAP;
        }

        cursor.y += GALLERY_TRAILING_GAP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_scenario() -> Scenario {
        Scenario {
            app_type: AppType::Backend,
            request_body: "GET /x".to_string(),
            response_body: "200 OK".to_string(),
            observations: "fine".to_string(),
            ..Scenario::new()
        }
    }

    fn layout_report(report: &Report) -> Vec<LayoutPage> {
        let font_context = FontContext::new();
        LayoutEngine::new().layout(report, &font_context)
    }

    fn page_texts(page: &LayoutPage) -> Vec<String> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { lines, .. } => Some(
                    lines
                        .iter()
                        .map(|l| l.text.clone())
                        .collect::<Vec<_>>()
                        .join("\n"),
                ),
                DrawOp::Image { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_single_backend_scenario_fits_one_page() {
        let report = Report {
            scenarios: vec![backend_scenario()],
            ..Report::new()
        };
        let pages = layout_report(&report);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_title_falls_back_when_name_empty() {
        let report = Report {
            scenarios: vec![backend_scenario()],
            ..Report::new()
        };
        let pages = layout_report(&report);
        assert_eq!(page_texts(&pages[0])[0], DEFAULT_TITLE);
    }

    #[test]
    fn test_empty_value_renders_dash() {
        let report = Report {
            scenarios: vec![Scenario::new()],
            ..Report::new()
        };
        let pages = layout_report(&report);
        let texts = page_texts(&pages[0]);
        assert!(texts.iter().any(|t| t == "-"));
    }

    #[test]
    fn test_backend_field_order() {
        let report = Report {
            scenarios: vec![backend_scenario()],
            ..Report::new()
        };
        let pages = layout_report(&report);
        let texts = page_texts(&pages[0]);
        let pos = |needle: &str| texts.iter().position(|t| t == needle).unwrap();
        assert!(pos("Request body") < pos("Response body"));
        assert!(pos("Response body") < pos("Observations"));
        assert!(!texts.iter().any(|t| t.starts_with("Screenshots")));
    }

    #[test]
    fn test_two_scenarios_two_pages() {
        let report = Report {
            scenarios: vec![backend_scenario(), backend_scenario()],
            ..Report::new()
        };
        let pages = layout_report(&report);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_cursor_breaks_before_overflow() {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(&PageSpec::default());
        cursor.y = cursor.limit() - 10.0;
        cursor.ensure_space(30.0, &mut pages);
        assert_eq!(pages.len(), 1);
        assert!((cursor.y - cursor.margin).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ensure_space_noop_when_fits() {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(&PageSpec::default());
        cursor.ensure_space(100.0, &mut pages);
        assert!(pages.is_empty());
    }
}
