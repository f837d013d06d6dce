//! # Evidoc
//!
//! An evidence report PDF exporter.
//!
//! QA engineers collect test evidence as a list of *scenarios*: the
//! application under test, the URL, a description, then either screenshots
//! (frontend tests) or request/response bodies (backend tests), and closing
//! observations. Evidoc takes that list and produces a paginated PDF report.
//!
//! The interesting part is the flow layout: titles, labelled text blocks and
//! variable-sized images are placed against a running vertical cursor, and
//! every block asks "does this fit on the page?" before it is drawn. Text
//! that doesn't fit is split at a line boundary and continues on the next
//! page; images are scaled down (never up) to the usable width; each
//! scenario starts on a fresh page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Report: scenarios, metadata, page spec
//!       ↓
//!   [layout]   — page-aware flow layout engine
//!       ↓
//!   [pdf]      — serialize to PDF bytes
//! ```

pub mod error;
pub mod model;
pub mod font;
pub mod text;
pub mod layout;
pub mod image_loader;
pub mod pdf;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::ExportError;

use font::FontContext;
use layout::LayoutEngine;
use model::Report;
use pdf::PdfWriter;

/// Render a report to PDF bytes.
///
/// This is the primary entry point. Rejects a report with no scenarios;
/// the editing UI is expected to keep at least one alive at all times.
pub fn render(report: &Report) -> Result<Vec<u8>, ExportError> {
    if report.scenarios.is_empty() {
        return Err(ExportError::EmptyReport);
    }
    let font_context = FontContext::new();
    let engine = LayoutEngine::new();
    let pages = engine.layout(report, &font_context);
    let writer = PdfWriter::new();
    Ok(writer.write(&pages, &report.metadata))
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, ExportError> {
    let report: Report = serde_json::from_str(json)?;
    render(&report)
}
