use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ForgeError, ForgeResult};

/// One detected UI element as reported by the vision-analysis stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default)]
    pub properties: ElementProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Why the raw record could not be read, for descriptors recovered by
    /// [`ElementDescriptor::from_value`]. Such a descriptor never passes
    /// [`ElementDescriptor::validate`].
    #[serde(skip)]
    pub defect: Option<String>,
}

impl ElementDescriptor {
    /// Read one raw element record. A record that does not fit the descriptor
    /// shape still yields a descriptor, carrying whatever `id` and `type` could
    /// be recovered and the reason in `defect`.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<ElementDescriptor>(value.clone()) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                let field = |key: &str| match value.get(key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                };
                let descriptor = Self {
                    id: field("id"),
                    element_type: field("type"),
                    defect: Some(e.to_string()),
                    ..Default::default()
                };
                tracing::warn!(
                    element_id = %descriptor.id,
                    error = %e,
                    "malformed element record"
                );
                descriptor
            }
        }
    }

    /// Everything the optimizer needs to trust before searching.
    pub fn validate(&self) -> ForgeResult<()> {
        if let Some(defect) = &self.defect {
            return Err(ForgeError::Descriptor(format!(
                "element '{}' is malformed: {defect}",
                self.id
            )));
        }
        self.validate_geometry()
    }

    /// Reject geometry that cannot describe a real element (negative or non-finite sizes).
    fn validate_geometry(&self) -> ForgeResult<()> {
        let Some(pos) = &self.position else {
            return Ok(());
        };
        for (axis, v) in [("width", pos.width), ("height", pos.height)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ForgeError::Descriptor(format!(
                    "element '{}' has invalid {axis}: {v}",
                    self.id
                )));
            }
        }
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return Err(ForgeError::Descriptor(format!(
                "element '{}' has a non-finite origin",
                self.id
            )));
        }
        Ok(())
    }

    /// Deterministic component name built from type and id, e.g. `ButtonE1`.
    pub fn component_name(&self) -> String {
        let kind = pascal_case(&self.element_type);
        let kind = if kind.is_empty() { "Element".to_string() } else { kind };
        let name = format!("{kind}{}", pascal_case(&self.id));
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("Ui{name}")
        } else {
            name
        }
    }

    /// Bounding-box area, 0 when no position was reported.
    pub fn area(&self) -> f64 {
        self.position
            .as_ref()
            .map(|p| p.width * p.height)
            .unwrap_or(0.0)
    }
}

/// Declared visual properties. Every field is optional; the vision stage only
/// reports what it could see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Value>,
    /// Anything else the vision stage reported. Counted towards complexity only.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementProperties {
    /// Number of properties actually reported.
    pub fn count(&self) -> usize {
        let strings = [
            &self.title,
            &self.text,
            &self.value,
            &self.color,
            &self.background_color,
            &self.text_color,
            &self.font_size,
            &self.font_weight,
            &self.border_radius,
            &self.border,
            &self.padding,
            &self.margin,
        ];
        let blobs = [&self.data, &self.config, &self.columns];
        strings.iter().filter(|s| s.is_some()).count()
            + blobs.iter().filter(|b| present(b)).count()
            + self.extra.len()
    }

    pub fn has_data(&self) -> bool {
        present(&self.data)
    }

    pub fn has_columns(&self) -> bool {
        present(&self.columns)
    }
}

fn present(v: &Option<Value>) -> bool {
    matches!(v, Some(v) if !v.is_null())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Job-level design summary. Only the aggregator artifact reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(default)]
    pub colors: ColorSummary,
    #[serde(default)]
    pub typography: TypographySummary,
    #[serde(default)]
    pub layout: LayoutSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub primary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secondary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub background: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub font_family: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub font_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub font_weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line_height: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    /// "grid", "flex" or "absolute".
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default)]
    pub columns: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gap: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub padding: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// One unit of work: every descriptor detected in one source image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: String,
    /// Malformed records are kept, see [`ElementDescriptor::from_value`].
    #[serde(default, alias = "components", deserialize_with = "lenient_elements")]
    pub elements: Vec<ElementDescriptor>,
    #[serde(flatten)]
    pub summary: JobSummary,
}

fn pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// One descriptor per array entry, whatever shape each entry has. A `null`
/// list reads as empty.
fn lenient_elements<'de, D>(deserializer: D) -> Result<Vec<ElementDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(ElementDescriptor::from_value)
        .collect())
}

/// Accepts strings, numbers and booleans; vision models are not consistent about
/// `"fontWeight": 400` versus `"fontWeight": "400"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
