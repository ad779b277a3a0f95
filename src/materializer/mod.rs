pub mod builders;
pub mod render_spec;
pub mod renderer;

use crate::errors::ForgeResult;
use crate::optimizer::state::Candidate;
use crate::perception::types::ElementDescriptor;

pub use render_spec::{RenderNode, RenderSpec};

/// Source text for an optimized candidate.
pub fn materialize(candidate: &Candidate) -> ForgeResult<String> {
    let spec = builders::build(
        candidate.component_type,
        &candidate.name,
        &candidate.id,
        &candidate.parameters,
    );
    renderer::render(&spec)
}

/// Source text for a descriptor whose pipeline failed: generic component named
/// `name`, position and defaults only.
pub fn materialize_fallback(descriptor: &ElementDescriptor, name: &str) -> ForgeResult<String> {
    let mut spec = builders::build_fallback(descriptor);
    spec.name = name.to_string();
    renderer::render(&spec)
}
