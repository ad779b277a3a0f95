use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::optimizer::catalogue::ComponentType;

/// Fully defaulted visual parameters for one element. No field is ever missing
/// by the time a parameter set reaches the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_size: String,
    pub font_weight: String,
    pub border_radius: String,
    pub border: String,
    pub padding: String,
    pub margin: String,
    pub title: String,
    pub text: String,
    pub value: String,
    pub data: Value,
    pub config: Value,
}

/// One parameter set considered during search, paired with its measured quality.
/// Candidates are never edited; every search step builds new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Id of the descriptor this candidate was derived from.
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub component_type: ComponentType,
    pub name: String,
    pub parameters: ParameterSet,
    pub quality: f64,
    pub iterations_used: u32,
}

impl Candidate {
    /// New candidate for the same element carrying other parameters.
    pub fn derive(&self, parameters: ParameterSet, quality: f64, iteration: u32) -> Self {
        Self {
            id: self.id.clone(),
            element_type: self.element_type.clone(),
            component_type: self.component_type,
            name: self.name.clone(),
            parameters,
            quality,
            iterations_used: iteration,
        }
    }
}

/// Lifecycle of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    Running {
        iteration: u32,
        best_quality: f64,
        stagnation: u32,
    },
    /// The last iteration produced a new best; the search continues.
    Improved { iteration: u32, best_quality: f64 },
    /// Too many consecutive iterations without improvement.
    Stagnant { iteration: u32 },
    /// A variant reached the quality threshold.
    ThresholdReached { iteration: u32 },
    /// The iteration budget ran out.
    Exhausted { iteration: u32 },
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchStatus::Stagnant { .. }
                | SearchStatus::ThresholdReached { .. }
                | SearchStatus::Exhausted { .. }
        )
    }

    /// Name of the state, for logs and manifests.
    pub fn label(&self) -> &'static str {
        match self {
            SearchStatus::Running { .. } => "running",
            SearchStatus::Improved { .. } => "improved",
            SearchStatus::Stagnant { .. } => "stagnant",
            SearchStatus::ThresholdReached { .. } => "threshold_reached",
            SearchStatus::Exhausted { .. } => "exhausted",
        }
    }
}

/// Result of optimizing one descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub best: Candidate,
    pub status: SearchStatus,
    pub max_iterations: u32,
    /// Iterations actually executed, including non-improving ones.
    pub iterations_run: u32,
    /// Best quality after each executed iteration.
    pub trace: Vec<f64>,
}
