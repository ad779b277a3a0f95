use serde::{Deserialize, Serialize};

/// Fixed quality of a fallback artifact.
pub const FALLBACK_QUALITY: f64 = 0.1;
/// The aggregator is derived from the job summary, never searched.
pub const AGGREGATOR_QUALITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Optimized per-element component.
    Element,
    /// Generic stand-in for an element whose pipeline failed.
    Fallback,
    /// Root component importing every element.
    Aggregator,
    Manifest,
}

impl ArtifactKind {
    /// Element-level artifacts; one per descriptor.
    pub fn is_element(&self) -> bool {
        matches!(self, ArtifactKind::Element | ArtifactKind::Fallback)
    }
}

/// One emitted unit ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub name: String,
    pub source_text: String,
    pub quality: f64,
    pub iterations: u32,
    pub kind: ArtifactKind,
    /// Descriptor this artifact came from; empty for job-level artifacts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub element_id: String,
}

impl GeneratedArtifact {
    pub fn element(name: String, element_id: &str, source_text: String, quality: f64, iterations: u32) -> Self {
        Self {
            name,
            source_text,
            quality: quality.clamp(0.0, 1.0),
            iterations,
            kind: ArtifactKind::Element,
            element_id: element_id.to_string(),
        }
    }

    pub fn fallback(name: String, element_id: &str, source_text: String) -> Self {
        Self {
            name,
            source_text,
            quality: FALLBACK_QUALITY,
            iterations: 0,
            kind: ArtifactKind::Fallback,
            element_id: element_id.to_string(),
        }
    }

    pub fn aggregator(name: String, source_text: String) -> Self {
        Self {
            name,
            source_text,
            quality: AGGREGATOR_QUALITY,
            iterations: 0,
            kind: ArtifactKind::Aggregator,
            element_id: String::new(),
        }
    }

    pub fn manifest(name: String, source_text: String) -> Self {
        Self {
            name,
            source_text,
            quality: AGGREGATOR_QUALITY,
            iterations: 0,
            kind: ArtifactKind::Manifest,
            element_id: String::new(),
        }
    }
}
