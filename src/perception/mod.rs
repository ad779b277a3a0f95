//! Inputs from the vision-analysis stage: element descriptors and the
//! job-level design summary.

pub mod job_file;
pub mod traits;
pub mod types;

pub use job_file::JsonJobSource;
pub use traits::DescriptorSource;
pub use types::{ElementDescriptor, ElementProperties, Job, JobSummary, Position};
