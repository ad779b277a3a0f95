pub mod aggregator;
pub mod artifact;
pub mod events;
pub mod orchestrator;
pub mod sink;

pub use artifact::{ArtifactKind, GeneratedArtifact};
pub use events::{EventBus, JobEvent};
pub use orchestrator::{BatchOrchestrator, JobReport};
pub use sink::{ArtifactSink, FsArtifactSink};
