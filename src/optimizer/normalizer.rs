use serde_json::Value;

use crate::optimizer::state::ParameterSet;
use crate::perception::types::ElementDescriptor;

pub const DEFAULT_WIDTH: f64 = 300.0;
pub const DEFAULT_HEIGHT: f64 = 200.0;
pub const DEFAULT_COLOR: &str = "#1976d2";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_SIZE: &str = "14px";
pub const DEFAULT_FONT_WEIGHT: &str = "400";
pub const DEFAULT_BORDER_RADIUS: &str = "4px";
pub const DEFAULT_BORDER: &str = "none";
pub const DEFAULT_PADDING: &str = "16px";
pub const DEFAULT_MARGIN: &str = "8px";

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: DEFAULT_COLOR.into(),
            background_color: DEFAULT_BACKGROUND_COLOR.into(),
            text_color: DEFAULT_TEXT_COLOR.into(),
            font_size: DEFAULT_FONT_SIZE.into(),
            font_weight: DEFAULT_FONT_WEIGHT.into(),
            border_radius: DEFAULT_BORDER_RADIUS.into(),
            border: DEFAULT_BORDER.into(),
            padding: DEFAULT_PADDING.into(),
            margin: DEFAULT_MARGIN.into(),
            title: String::new(),
            text: String::new(),
            value: String::new(),
            data: Value::Array(Vec::new()),
            config: Value::Object(Default::default()),
        }
    }
}

/// Fill every property the descriptor left out. Never fails.
pub fn normalize(descriptor: &ElementDescriptor) -> ParameterSet {
    let d = ParameterSet::default();
    let p = &descriptor.properties;
    let pick = |v: &Option<String>, fallback: String| v.clone().unwrap_or(fallback);

    ParameterSet {
        width: descriptor.position.map(|pos| pos.width).unwrap_or(d.width),
        height: descriptor.position.map(|pos| pos.height).unwrap_or(d.height),
        color: pick(&p.color, d.color),
        background_color: pick(&p.background_color, d.background_color),
        text_color: pick(&p.text_color, d.text_color),
        font_size: pick(&p.font_size, d.font_size),
        font_weight: pick(&p.font_weight, d.font_weight),
        border_radius: pick(&p.border_radius, d.border_radius),
        border: pick(&p.border, d.border),
        padding: pick(&p.padding, d.padding),
        margin: pick(&p.margin, d.margin),
        title: pick(&p.title, d.title),
        text: pick(&p.text, d.text),
        value: pick(&p.value, d.value),
        data: blob(&p.data).unwrap_or(d.data),
        config: blob(&p.config).unwrap_or(d.config),
    }
}

fn blob(v: &Option<Value>) -> Option<Value> {
    v.as_ref().filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::{ElementProperties, Position};

    #[test]
    fn empty_descriptor_gets_all_defaults() {
        let set = normalize(&ElementDescriptor::default());
        assert_eq!(set, ParameterSet::default());
        assert_eq!(set.width, 300.0);
        assert_eq!(set.height, 200.0);
        assert_eq!(set.font_size, "14px");
        assert_eq!(set.data, serde_json::json!([]));
        assert_eq!(set.config, serde_json::json!({}));
    }

    #[test]
    fn unknown_type_still_normalizes() {
        let d = ElementDescriptor {
            id: "x".into(),
            element_type: "hologram".into(),
            ..Default::default()
        };
        assert_eq!(normalize(&d).color, DEFAULT_COLOR);
    }

    #[test]
    fn declared_values_win_over_defaults() {
        let d = ElementDescriptor {
            id: "b".into(),
            element_type: "button".into(),
            properties: ElementProperties {
                text: Some("Save".into()),
                background_color: Some("#ff0000".into()),
                data: Some(Value::Null),
                ..Default::default()
            },
            position: Some(Position { x: 5.0, y: 5.0, width: 120.0, height: 40.0 }),
            defect: None,
        };
        let set = normalize(&d);
        assert_eq!(set.text, "Save");
        assert_eq!(set.background_color, "#ff0000");
        assert_eq!(set.width, 120.0);
        assert_eq!(set.height, 40.0);
        // an explicit null blob counts as missing
        assert_eq!(set.data, serde_json::json!([]));
    }
}
