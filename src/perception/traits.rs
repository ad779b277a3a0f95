use async_trait::async_trait;

use crate::errors::ForgeResult;
use crate::perception::types::Job;

/// Strategy trait for obtaining a job's element descriptors from the
/// upstream vision-analysis stage.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    async fn load_job(&self) -> ForgeResult<Job>;
}
