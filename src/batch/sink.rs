use std::path::PathBuf;

use async_trait::async_trait;

use crate::batch::artifact::{ArtifactKind, GeneratedArtifact};
use crate::config::OutputConfig;
use crate::errors::{ForgeError, ForgeResult};

/// Downstream persistence collaborator: one artifact, one file.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Create the job's output location. Called once before anything is persisted.
    async fn prepare(&self, job_id: &str) -> ForgeResult<()>;

    /// Store one artifact and return where it went.
    async fn persist(&self, job_id: &str, artifact: &GeneratedArtifact) -> ForgeResult<PathBuf>;

    /// File name the artifact will be stored under.
    fn file_name(&self, artifact: &GeneratedArtifact) -> String;
}

/// Writes `<directory>/<job id>/<artifact name>.<extension>`.
pub struct FsArtifactSink {
    output: OutputConfig,
}

impl FsArtifactSink {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.output.directory.join(job_id)
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn prepare(&self, job_id: &str) -> ForgeResult<()> {
        let dir = self.job_dir(job_id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ForgeError::Persistence(format!("cannot create {}: {e}", dir.display()))
        })?;
        tracing::debug!(path = %dir.display(), "output directory ready");
        Ok(())
    }

    async fn persist(&self, job_id: &str, artifact: &GeneratedArtifact) -> ForgeResult<PathBuf> {
        let path = self.job_dir(job_id).join(self.file_name(artifact));
        tokio::fs::write(&path, artifact.source_text.as_bytes()).await?;
        tracing::debug!(path = %path.display(), bytes = artifact.source_text.len(), "artifact written");
        Ok(path)
    }

    fn file_name(&self, artifact: &GeneratedArtifact) -> String {
        let ext = match artifact.kind {
            ArtifactKind::Manifest => &self.output.manifest_extension,
            _ => &self.output.extension,
        };
        format!("{}.{}", artifact.name, ext.trim_start_matches('.'))
    }
}
