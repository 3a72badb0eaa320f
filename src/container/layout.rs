//! Typed views over the layout and metadata parts.
//!
//! These are projections of already-normalized parts. Every field is
//! optional or defaulted, so unknown or missing keys never fail a read;
//! the untyped [`Document::get`] value remains the source of truth.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::container::content_map::PartName;
use crate::container::document::Document;

/// Root of the `Report/Layout` part.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportLayout {
    #[serde(deserialize_with = "lenient_f64")]
    pub id: Option<f64>,
    pub resource_packages: Vec<Value>,
    pub sections: Vec<LayoutSection>,
    pub config: Option<Value>,
    #[serde(deserialize_with = "lenient_f64")]
    pub layout_optimization: Option<f64>,
}

/// A report page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSection {
    #[serde(deserialize_with = "lenient_f64")]
    pub id: Option<f64>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    /// Page filters
    pub filters: Option<Value>,
    /// Page number
    #[serde(deserialize_with = "lenient_f64")]
    pub ordinal: Option<f64>,
    pub visual_containers: Vec<VisualContainer>,
    pub config: Option<Value>,
    /// 1 = fit to page, 2 = fit to width, 3 = actual size
    #[serde(deserialize_with = "lenient_f64")]
    pub display_option: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
}

/// A visual placed on a page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualContainer {
    #[serde(deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
    /// Layer in the stacking order
    #[serde(deserialize_with = "lenient_f64")]
    pub z: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
    pub config: Option<Value>,
    pub filters: Option<Value>,
    pub query: Option<Value>,
    pub data_transforms: Option<Value>,
}

impl VisualContainer {
    /// The visual type from `config.singleVisual.visualType`, e.g. `card`.
    pub fn visual_type(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .get("singleVisual")?
            .get("visualType")?
            .as_str()
    }
}

/// The `Metadata` part.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportMetadata {
    #[serde(deserialize_with = "lenient_f64")]
    pub version: Option<f64>,
    pub auto_created_relationships: Vec<Value>,
    pub file_description: Option<String>,
    pub created_from: Option<String>,
    pub created_from_release: Option<String>,
}

/// Accept a JSON number, a numeric string, or null.
///
/// Numeric strings survive normalization as strings, so both spellings occur.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

impl Document {
    /// Display names of the report pages, in layout order.
    ///
    /// `None` if the layout part is absent or has no `sections` array.
    pub fn sections(&self) -> Option<Vec<String>> {
        let sections = self.part_ref(PartName::Layout)?.get("sections")?.as_array()?;
        Some(
            sections
                .iter()
                .map(|s| {
                    s.get("displayName")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect(),
        )
    }

    /// Typed view of the layout part.
    pub fn report_layout(&self) -> serde_json::Result<Option<ReportLayout>> {
        self.part_ref(PartName::Layout)
            .map(|value| ReportLayout::deserialize(value))
            .transpose()
    }

    /// Typed view of the metadata part.
    pub fn report_metadata(&self) -> serde_json::Result<Option<ReportMetadata>> {
        self.part_ref(PartName::Metadata)
            .map(|value| ReportMetadata::deserialize(value))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::document::DocumentBuilder;
    use crate::normalize::normalize;
    use serde_json::json;

    fn document_with_layout() -> Document {
        let raw = json!({
            "id": 0,
            "sections": [
                {
                    "name": "ReportSection",
                    "displayName": "Overview",
                    "ordinal": 0,
                    "width": 1280,
                    "height": "720",
                    "visualContainers": [{
                        "x": 10.5,
                        "y": 20,
                        "z": 1000,
                        "config": "{\"name\":\"v1\",\"singleVisual\":{\"visualType\":\"card\"}}",
                        "filters": "[]"
                    }]
                },
                { "name": "ReportSection2", "displayName": "Details", "ordinal": 1 }
            ],
            "config": "{\"version\":\"5.43\"}"
        });

        let mut builder = DocumentBuilder::new("t.pbix");
        assert!(builder.part(PartName::Layout, normalize(raw)));
        assert!(builder.part(
            PartName::Metadata,
            json!({ "version": 5, "createdFrom": "Cloud", "createdFromRelease": "2023.01" }),
        ));
        builder.build()
    }

    #[test]
    fn test_sections_display_names() {
        let doc = document_with_layout();
        assert_eq!(
            doc.sections(),
            Some(vec!["Overview".to_string(), "Details".to_string()])
        );
    }

    #[test]
    fn test_sections_absent_without_layout() {
        let doc = DocumentBuilder::new("t.pbix").build();
        assert_eq!(doc.sections(), None);
        assert_eq!(doc.report_layout().unwrap(), None);
    }

    #[test]
    fn test_report_layout_view() {
        let layout = document_with_layout().report_layout().unwrap().unwrap();
        assert_eq!(layout.sections.len(), 2);

        let page = &layout.sections[0];
        assert_eq!(page.width, Some(1280.0));
        // numeric string kept verbatim by normalization
        assert_eq!(page.height, Some(720.0));
        assert_eq!(page.visual_containers[0].visual_type(), Some("card"));
        assert_eq!(page.visual_containers[0].filters, Some(json!([])));
        assert_eq!(layout.config, Some(json!({ "version": "5.43" })));
    }

    #[test]
    fn test_report_metadata_view() {
        let metadata = document_with_layout().report_metadata().unwrap().unwrap();
        assert_eq!(metadata.version, Some(5.0));
        assert_eq!(metadata.created_from.as_deref(), Some("Cloud"));
        assert!(metadata.auto_created_relationships.is_empty());
    }
}
