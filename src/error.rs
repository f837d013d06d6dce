//! Structured error types for the export pipeline.
//!
//! Two families: `ExportError` is what the public API returns, `ImageError`
//! covers per-image failures that the layout engine recovers from by
//! skipping the image.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON input failed to parse as a report.
    #[error("failed to parse report: {0}")]
    Parse(#[from] serde_json::Error),

    /// The report contains no scenarios. The editing session keeps at least
    /// one scenario alive at all times, so an empty list means the caller
    /// constructed the report by hand and got it wrong.
    #[error("report contains no scenarios")]
    EmptyReport,
}

/// A failure while resolving or decoding a single image source.
///
/// These never abort an export: the gallery logs the failure and moves on
/// to the next image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid data URI: missing ',' separator")]
    MalformedDataUri,

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to read image file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("image source type not available on this target: {0}")]
    UnsupportedSource(String),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported image format (JPEG or PNG expected)")]
    UnknownFormat,
}
