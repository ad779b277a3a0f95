use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    JobStarted {
        job_id: String,
        elements: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    ElementOptimized {
        element_id: String,
        name: String,
        quality: f64,
        iterations: u32,
        status: String,
    },
    ElementFellBack {
        element_id: String,
        name: String,
        error: String,
    },
    ArtifactPersisted {
        name: String,
        path: PathBuf,
    },
    JobCompleted {
        job_id: String,
        artifacts: usize,
        fallbacks: usize,
        mean_quality: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Fan-out of job progress. Sending never fails the job: with no subscribers
/// the event is dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JobEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.tx.subscribe()
    }

    pub fn send(&self, event: JobEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("job event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
