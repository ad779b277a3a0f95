use serde::{Deserialize, Serialize};

use crate::batch::artifact::{ArtifactKind, GeneratedArtifact};
use crate::errors::ForgeResult;
use crate::materializer::render_spec::{PropValue, RenderNode, RenderSpec};
use crate::materializer::renderer;
use crate::perception::types::{JobSummary, Position};

pub const AGGREGATOR_NAME: &str = "App";
pub const MANIFEST_NAME: &str = "manifest";

/// An element as the aggregator sees it: its component name and where it sits.
#[derive(Debug, Clone)]
pub struct PlacedElement {
    pub name: String,
    pub position: Option<Position>,
}

/// Root component importing every element. Its style comes straight from the
/// job summary; nothing here is optimized.
pub fn build_aggregator(name: &str, summary: &JobSummary, elements: &[PlacedElement]) -> ForgeResult<String> {
    let layout = summary.layout.kind.as_deref().map(str::to_ascii_lowercase);
    let in_flow = matches!(layout.as_deref(), Some("grid") | Some("flex"));

    let mut root = RenderNode::mui("Box").styles(root_style(summary, layout.as_deref()));
    for element in elements {
        let node = RenderNode::imported(&format!("./{}", element.name), &element.name);
        root = match element.position {
            Some(p) if !in_flow => root.child(
                RenderNode::mui("Box")
                    .style("position", "absolute")
                    .style("left", p.x)
                    .style("top", p.y)
                    .child(node),
            ),
            _ => root.child(node),
        };
    }
    renderer::render(&RenderSpec::new(name, root))
}

fn root_style(summary: &JobSummary, layout: Option<&str>) -> Vec<(String, PropValue)> {
    let mut style: Vec<(String, PropValue)> = Vec::new();
    let mut put = |key: &str, value: Option<PropValue>| {
        if let Some(v) = value {
            style.push((key.to_string(), v));
        }
    };
    let text = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).map(PropValue::from);

    match layout {
        Some("grid") => {
            put("display", Some("grid".into()));
            let columns = summary.layout.columns.filter(|c| *c > 0).unwrap_or(1);
            put("gridTemplateColumns", Some(format!("repeat({columns}, 1fr)").into()));
        }
        Some("flex") => {
            put("display", Some("flex".into()));
            put("flexWrap", Some("wrap".into()));
        }
        _ => put("position", Some("relative".into())),
    }
    let size = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0).map(PropValue::Num);
    put("width", size(summary.layout.width));
    put("height", size(summary.layout.height));
    put("gap", text(&summary.layout.gap));
    put("padding", text(&summary.layout.padding));
    put("backgroundColor", text(&summary.colors.background));
    put("color", text(&summary.colors.text));
    put("fontFamily", text(&summary.typography.font_family));
    put("fontSize", text(&summary.typography.font_size));
    put("fontWeight", text(&summary.typography.font_weight));
    put("lineHeight", text(&summary.typography.line_height));
    style
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub job_id: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub artifacts: Vec<ManifestEntry>,
    /// Mean quality over element and fallback artifacts; 0 for an empty job.
    pub mean_quality: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub file: String,
    pub kind: ArtifactKind,
    pub quality: f64,
    pub iterations: u32,
}

pub fn mean_element_quality(artifacts: &[GeneratedArtifact]) -> f64 {
    let qualities: Vec<f64> = artifacts
        .iter()
        .filter(|a| a.kind.is_element())
        .map(|a| a.quality)
        .collect();
    if qualities.is_empty() {
        0.0
    } else {
        qualities.iter().sum::<f64>() / qualities.len() as f64
    }
}

/// Manifest describing the given artifacts and the file each is stored in.
pub fn build_manifest(
    job_id: &str,
    artifacts: &[GeneratedArtifact],
    file_name: impl Fn(&GeneratedArtifact) -> String,
) -> ForgeResult<String> {
    let manifest = Manifest {
        job_id: job_id.to_string(),
        generated_at: chrono::Utc::now(),
        artifacts: artifacts
            .iter()
            .map(|a| ManifestEntry {
                name: a.name.clone(),
                file: file_name(a),
                kind: a.kind,
                quality: a.quality,
                iterations: a.iterations,
            })
            .collect(),
        mean_quality: mean_element_quality(artifacts),
    };
    Ok(serde_json::to_string_pretty(&manifest)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::{ColorSummary, LayoutSummary};

    fn placed(name: &str, x: f64, y: f64) -> PlacedElement {
        PlacedElement {
            name: name.into(),
            position: Some(Position { x, y, width: 10.0, height: 10.0 }),
        }
    }

    #[test]
    fn aggregator_imports_and_places_elements() {
        let summary = JobSummary {
            colors: ColorSummary {
                background: Some("#fafafa".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let src = build_aggregator(
            AGGREGATOR_NAME,
            &summary,
            &[placed("ButtonE1", 10.0, 20.0), PlacedElement { name: "CardE2".into(), position: None }],
        )
        .unwrap();

        assert!(src.contains("import { ButtonE1 } from './ButtonE1';"));
        assert!(src.contains("import { CardE2 } from './CardE2';"));
        assert!(src.contains("sx={{ position: \"relative\", backgroundColor: \"#fafafa\" }}"));
        assert!(src.contains("sx={{ position: \"absolute\", left: 10, top: 20 }}"));
        assert!(src.contains("export const App: React.FC"));
    }

    #[test]
    fn grid_layout_keeps_elements_in_flow() {
        let summary = JobSummary {
            layout: LayoutSummary {
                kind: Some("Grid".into()),
                columns: Some(3),
                gap: Some("16px".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let src = build_aggregator(AGGREGATOR_NAME, &summary, &[placed("TextT1", 5.0, 5.0)]).unwrap();
        assert!(src.contains("display: \"grid\", gridTemplateColumns: \"repeat(3, 1fr)\", gap: \"16px\""));
        assert!(!src.contains("absolute"));
        assert!(src.contains("<TextT1 />"));
    }

    #[test]
    fn manifest_lists_files_and_mean_quality() {
        let artifacts = vec![
            GeneratedArtifact::element("ButtonE1".into(), "e1", String::new(), 0.9, 2),
            GeneratedArtifact::fallback("CardE2".into(), "e2", String::new()),
            GeneratedArtifact::aggregator("App".into(), String::new()),
        ];
        let json = build_manifest("job-1", &artifacts, |a| format!("{}.tsx", a.name)).unwrap();
        let m: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(m.job_id, "job-1");
        assert_eq!(m.artifacts.len(), 3);
        assert_eq!(m.artifacts[1].file, "CardE2.tsx");
        assert_eq!(m.artifacts[1].kind, ArtifactKind::Fallback);
        assert!((m.mean_quality - 0.5).abs() < 1e-9);
    }
}
