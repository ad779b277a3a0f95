//! Parameter perturbation for the local search.
//!
//! Each selected parameter contributes its own variation set; every entry of
//! every set becomes one new parameter set with only that parameter changed.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::optimizer::catalogue::Parameter;
use crate::optimizer::color;
use crate::optimizer::state::ParameterSet;
use crate::perception::types::ElementDescriptor;

/// Size multipliers at full intensity.
pub const BASE_FACTORS: [f64; 6] = [0.8, 0.9, 0.95, 1.05, 1.1, 1.2];

/// Fraction of the intensity applied to colour channels.
const COLOR_STEP: f64 = 0.3;

const DEFAULT_FONT_PX: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityClass {
    Simple,
    Medium,
    Complex,
}

/// Coarse complexity on [0, 1] from property count, box area and the presence
/// of data and column blobs.
pub fn complexity_score(descriptor: &ElementDescriptor) -> f64 {
    let props = &descriptor.properties;
    let area = descriptor.area().max(0.0);
    let mut score = props.count() as f64 * 0.1 + (area + 1.0).ln() * 0.05;
    if props.has_data() {
        score += 0.3;
    }
    if props.has_columns() {
        score += 0.2;
    }
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

pub fn complexity_class(score: f64) -> ComplexityClass {
    if score < 0.3 {
        ComplexityClass::Simple
    } else if score < 0.7 {
        ComplexityClass::Medium
    } else {
        ComplexityClass::Complex
    }
}

/// How many of the key parameters the search perturbs: the first two for
/// simple elements, all of them above 0.7, otherwise the first half rounded up.
pub fn select_parameters(key_parameters: &[Parameter], complexity: f64) -> &[Parameter] {
    let n = key_parameters.len();
    let take = if complexity < 0.3 {
        2.min(n)
    } else if complexity > 0.7 {
        n
    } else {
        n.div_ceil(2)
    };
    &key_parameters[..take]
}

/// Scale a full-strength factor towards 1 by `intensity`.
pub fn attenuate(factor: f64, intensity: f64) -> f64 {
    1.0 + (factor - 1.0) * intensity
}

/// All single-parameter variants of `base` for the given parameters.
/// Never empty as long as `parameters` is not.
pub fn generate(base: &ParameterSet, parameters: &[Parameter], intensity: f64) -> Vec<ParameterSet> {
    parameters
        .iter()
        .flat_map(|p| vary(base, *p, intensity))
        .collect()
}

/// Variation set for one parameter. Parameters without a rule yield the
/// unchanged set, so the result always holds at least one entry.
pub fn vary(base: &ParameterSet, parameter: Parameter, intensity: f64) -> Vec<ParameterSet> {
    match parameter {
        Parameter::Width => scaled_lengths(base.width, intensity)
            .into_iter()
            .map(|width| ParameterSet { width, ..base.clone() })
            .collect(),
        Parameter::Height => scaled_lengths(base.height, intensity)
            .into_iter()
            .map(|height| ParameterSet { height, ..base.clone() })
            .collect(),
        Parameter::FontSize => font_sizes(&base.font_size, intensity)
            .into_iter()
            .map(|font_size| ParameterSet { font_size, ..base.clone() })
            .collect(),
        Parameter::Color => color_shades(&base.color, intensity)
            .into_iter()
            .map(|color| ParameterSet { color, ..base.clone() })
            .collect(),
        Parameter::BackgroundColor => color_shades(&base.background_color, intensity)
            .into_iter()
            .map(|background_color| ParameterSet { background_color, ..base.clone() })
            .collect(),
        _ => vec![base.clone()],
    }
}

fn scaled_lengths(value: f64, intensity: f64) -> Vec<f64> {
    BASE_FACTORS
        .iter()
        .map(|f| (value * attenuate(*f, intensity)).round())
        .collect()
}

fn font_size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-?\d+)(?:\.\d*)?\s*([a-zA-Z%]*)").expect("static regex")
    })
}

/// Leading integer and unit suffix of a font size, `(14, "px")` when unparsable.
pub fn split_font_size(font_size: &str) -> (i64, String) {
    let Some(caps) = font_size_pattern().captures(font_size) else {
        return (DEFAULT_FONT_PX, "px".into());
    };
    let size = caps[1].parse::<i64>().unwrap_or(DEFAULT_FONT_PX);
    let unit = match &caps[2] {
        "" => "px".to_string(),
        u => u.to_string(),
    };
    (size, unit)
}

fn font_sizes(font_size: &str, intensity: f64) -> Vec<String> {
    let (size, unit) = split_font_size(font_size);
    BASE_FACTORS
        .iter()
        .map(|f| {
            let scaled = (size as f64 * attenuate(*f, intensity)).round() as i64;
            format!("{scaled}{unit}")
        })
        .collect()
}

/// `[original, lighter, darker]`, or just the original for non-hex input.
fn color_shades(original: &str, intensity: f64) -> Vec<String> {
    let step = intensity * COLOR_STEP;
    match (
        color::scale(original, 1.0 + step),
        color::scale(original, 1.0 - step),
    ) {
        (Some(lighter), Some(darker)) => vec![original.to_string(), lighter, darker],
        _ => vec![original.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::{ElementProperties, Position};

    #[test]
    fn selection_depends_on_complexity() {
        let keys = [
            Parameter::Width,
            Parameter::Height,
            Parameter::Color,
            Parameter::Data,
            Parameter::Config,
        ];
        assert_eq!(select_parameters(&keys, 0.1).len(), 2);
        assert_eq!(select_parameters(&keys, 0.5).len(), 3);
        assert_eq!(select_parameters(&keys, 0.7).len(), 3);
        assert_eq!(select_parameters(&keys, 0.71).len(), 5);
        assert_eq!(select_parameters(&keys[..1], 0.1), &[Parameter::Width]);
    }

    #[test]
    fn complexity_counts_properties_area_and_blobs() {
        let plain = ElementDescriptor::default();
        assert_eq!(complexity_score(&plain), 0.0);

        let table = ElementDescriptor {
            properties: ElementProperties {
                title: Some("Orders".into()),
                data: Some(serde_json::json!([{ "a": 1 }])),
                columns: Some(serde_json::json!(["a"])),
                ..Default::default()
            },
            position: Some(Position { x: 0.0, y: 0.0, width: 10.0, height: 10.0 }),
            ..Default::default()
        };
        // 3 props · 0.1 + ln(101) · 0.05 + 0.3 + 0.2 > 1 → clamped
        assert_eq!(complexity_score(&table), 1.0);
        assert_eq!(complexity_class(1.0), ComplexityClass::Complex);
        assert_eq!(complexity_class(0.29), ComplexityClass::Simple);
        assert_eq!(complexity_class(0.3), ComplexityClass::Medium);
    }

    #[test]
    fn width_variants_are_attenuated_and_rounded() {
        let base = ParameterSet { width: 200.0, ..Default::default() };
        let widths: Vec<f64> = vary(&base, Parameter::Width, 0.1)
            .iter()
            .map(|p| p.width)
            .collect();
        // factors 0.98, 0.99, 0.995, 1.005, 1.01, 1.02
        assert_eq!(widths, vec![196.0, 198.0, 199.0, 201.0, 202.0, 204.0]);
    }

    #[test]
    fn font_size_keeps_unit_suffix() {
        let base = ParameterSet { font_size: "20rem".into(), ..Default::default() };
        let sizes: Vec<String> = vary(&base, Parameter::FontSize, 0.3)
            .into_iter()
            .map(|p| p.font_size)
            .collect();
        assert_eq!(sizes.len(), 6);
        assert!(sizes.iter().all(|s| s.ends_with("rem")));
        assert_eq!(sizes[0], "19rem"); // 20 · 0.94 = 18.8
        assert_eq!(split_font_size("bold"), (14, "px".to_string()));
        assert_eq!(split_font_size("16"), (16, "px".to_string()));
    }

    #[test]
    fn color_variants_include_original_lighter_darker() {
        let base = ParameterSet { color: "#646464".into(), ..Default::default() };
        let colors: Vec<String> = vary(&base, Parameter::Color, 0.2)
            .into_iter()
            .map(|p| p.color)
            .collect();
        // step 0.06: 100 · 1.06 = 106, 100 · 0.94 = 94
        assert_eq!(colors, vec!["#646464", "#6a6a6a", "#5e5e5e"]);
    }

    #[test]
    fn non_hex_color_yields_only_original() {
        let base = ParameterSet { background_color: "transparent".into(), ..Default::default() };
        let v = vary(&base, Parameter::BackgroundColor, 0.3);
        assert_eq!(v, vec![base]);
    }

    #[test]
    fn parameters_without_rules_yield_unchanged_singleton() {
        let base = ParameterSet::default();
        for p in [Parameter::Data, Parameter::Config, Parameter::Title, Parameter::TextColor] {
            assert_eq!(vary(&base, p, 0.3), vec![base.clone()]);
        }
    }

    #[test]
    fn generate_changes_one_parameter_per_variant() {
        let base = ParameterSet::default();
        let all = generate(&base, &[Parameter::Width, Parameter::Color, Parameter::Data], 0.1);
        assert_eq!(all.len(), 6 + 3 + 1);
        for v in &all[..6] {
            assert_eq!(v.color, base.color);
            assert_ne!(v.width, base.width);
        }
    }
}
