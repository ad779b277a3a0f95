//! Parameter search: normalization, scoring, perturbation and the bounded
//! local-search loop that ties them together.

pub mod catalogue;
pub mod color;
pub mod engine;
pub mod loop_control;
pub mod normalizer;
pub mod quality;
pub mod state;
pub mod variants;

pub use catalogue::{Catalogue, ComponentType, Parameter};
pub use engine::Optimizer;
pub use state::{Candidate, OptimizationOutcome, ParameterSet, SearchStatus};
