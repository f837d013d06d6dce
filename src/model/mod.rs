//! # Report Model
//!
//! The input representation for the export pipeline. A report is an ordered
//! list of scenarios plus document metadata and a page specification. The
//! field names mirror the JSON the evidence-collection UI produces
//! (camelCase), so a report serialized there deserializes here unchanged.

use serde::{Deserialize, Serialize};

/// A complete report ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// The scenarios, in export order. Identity of a scenario in the UI is
    /// an opaque token; export only ever uses list order.
    pub scenarios: Vec<Scenario>,

    /// Document metadata embedded in the PDF Info dictionary.
    #[serde(default)]
    pub metadata: Metadata,

    /// Page geometry used for every page of the report.
    #[serde(default)]
    pub page: PageSpec,
}

impl Report {
    /// A fresh report with a single default scenario — the editing session
    /// never holds fewer than one.
    pub fn new() -> Self {
        Self {
            scenarios: vec![Scenario::new()],
            metadata: Metadata::default(),
            page: PageSpec::default(),
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Page geometry: size plus a uniform margin on all four sides, in points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "default_margin")]
    pub margin: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> f64 {
    40.0
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Which shape of evidence a scenario carries.
///
/// Frontend scenarios hold before/after screenshot galleries; backend
/// scenarios hold request/response bodies. The branch is exhaustive at
/// every use site, so a third kind of application is a compile-time-visible
/// change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    #[default]
    Frontend,
    Backend,
}

impl AppType {
    /// The label printed in the report, matching the UI's select values.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Frontend => "frontend",
            AppType::Backend => "backend",
        }
    }
}

/// One user-authored test-evidence record.
///
/// Text fields are optional-as-empty: an empty string renders as a
/// placeholder dash, never as an error. Screenshot entries are image
/// *sources* — data URIs, raw base64, or file paths — resolved by the
/// image loader at export time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub application_name: String,

    #[serde(default)]
    pub app_type: AppType,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Screenshots taken before the change. Only meaningful for
    /// `AppType::Frontend`.
    #[serde(default)]
    pub screenshots_before: Vec<String>,

    /// Screenshots taken after the change. Only meaningful for
    /// `AppType::Frontend`.
    #[serde(default)]
    pub screenshots_after: Vec<String>,

    /// Only meaningful for `AppType::Backend`.
    #[serde(default)]
    pub request_body: String,

    /// Only meaningful for `AppType::Backend`.
    #[serde(default)]
    pub response_body: String,

    /// Always rendered, regardless of app type.
    #[serde(default)]
    pub observations: String,
}

impl Scenario {
    /// A blank frontend scenario — the single place the defaults live.
    pub fn new() -> Self {
        Self {
            application_name: String::new(),
            app_type: AppType::Frontend,
            url: String::new(),
            title: String::new(),
            description: String::new(),
            screenshots_before: Vec::new(),
            screenshots_after: Vec::new(),
            request_body: String::new(),
            response_body: String::new(),
            observations: String::new(),
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_starts_with_one_scenario() {
        let report = Report::new();
        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.scenarios[0].app_type, AppType::Frontend);
    }

    #[test]
    fn test_page_spec_defaults() {
        let spec = PageSpec::default();
        let (w, h) = spec.size.dimensions();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
        assert!((spec.margin - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scenario_deserializes_camel_case() {
        let json = r#"{
            "applicationName": "Shop",
            "appType": "backend",
            "requestBody": "GET /cart",
            "responseBody": "200 OK",
            "observations": "fine"
        }"#;
        let s: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(s.application_name, "Shop");
        assert_eq!(s.app_type, AppType::Backend);
        assert_eq!(s.request_body, "GET /cart");
        assert!(s.screenshots_before.is_empty());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let s: Scenario = serde_json::from_str("{}").unwrap();
        assert!(s.application_name.is_empty());
        assert_eq!(s.app_type, AppType::Frontend);
        assert!(s.observations.is_empty());
    }
}
