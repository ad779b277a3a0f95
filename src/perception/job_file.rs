use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::{ForgeError, ForgeResult};
use crate::perception::traits::DescriptorSource;
use crate::perception::types::Job;

/// Reads one job from a JSON file written by the vision-analysis stage.
///
/// Accepted shape: `{ id?, elements | components, colors, typography, layout }`.
/// A job without an id gets a random one so its output directory is unique.
pub struct JsonJobSource {
    path: PathBuf,
}

impl JsonJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DescriptorSource for JsonJobSource {
    async fn load_job(&self) -> ForgeResult<Job> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut job: Job = serde_json::from_str(&content)?;

        if job.id.trim().is_empty() {
            job.id = uuid::Uuid::new_v4().to_string();
            tracing::debug!(job_id = %job.id, "job file has no id, generated one");
        }
        if job.id.contains(|c: char| c == '/' || c == '\\') || job.id.contains("..") {
            return Err(ForgeError::Descriptor(format!(
                "job id '{}' cannot be used as a directory name",
                job.id
            )));
        }

        tracing::info!(
            path = %self.path.display(),
            job_id = %job.id,
            elements = job.elements.len(),
            "job loaded"
        );
        Ok(job)
    }
}
