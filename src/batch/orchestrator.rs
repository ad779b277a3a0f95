use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::batch::aggregator::{self, PlacedElement, AGGREGATOR_NAME, MANIFEST_NAME};
use crate::batch::artifact::{ArtifactKind, GeneratedArtifact};
use crate::batch::events::{EventBus, JobEvent};
use crate::batch::sink::ArtifactSink;
use crate::errors::ForgeResult;
use crate::materializer;
use crate::optimizer::state::Candidate;
use crate::optimizer::Optimizer;
use crate::perception::traits::DescriptorSource;
use crate::perception::types::{ElementDescriptor, Job};

/// Result of one job, in persistence order: elements, aggregator, manifest.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: String,
    pub artifacts: Vec<GeneratedArtifact>,
    pub paths: Vec<PathBuf>,
    pub fallbacks: usize,
    pub mean_quality: f64,
}

impl JobReport {
    /// One artifact per descriptor, in descriptor order.
    pub fn element_artifacts(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter().filter(|a| a.kind.is_element())
    }
}

/// Runs normalize → optimize → materialize for every descriptor of a job,
/// one after the other, then persists the results.
pub struct BatchOrchestrator {
    optimizer: Optimizer,
    sink: Arc<dyn ArtifactSink>,
    events: EventBus,
}

impl BatchOrchestrator {
    pub fn new(optimizer: Optimizer, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            optimizer,
            sink,
            events: EventBus::new(),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Load a job from `source` and run it.
    pub async fn run(&self, source: &dyn DescriptorSource) -> ForgeResult<JobReport> {
        let job = source.load_job().await?;
        self.run_job(&job).await
    }

    /// Element failures become fallback artifacts; sink failures abort the job.
    pub async fn run_job(&self, job: &Job) -> ForgeResult<JobReport> {
        self.sink.prepare(&job.id).await?;
        self.events.send(JobEvent::JobStarted {
            job_id: job.id.clone(),
            elements: job.elements.len(),
            timestamp: chrono::Utc::now(),
        });
        tracing::info!(job_id = %job.id, elements = job.elements.len(), "job started");

        let mut names: HashSet<String> = HashSet::from([AGGREGATOR_NAME.to_string()]);
        let mut artifacts = Vec::with_capacity(job.elements.len() + 2);
        let mut placed = Vec::with_capacity(job.elements.len());
        for descriptor in &job.elements {
            let name = unique_name(&mut names, descriptor.component_name());
            let artifact = self.process_element(descriptor, name)?;
            placed.push(PlacedElement {
                name: artifact.name.clone(),
                position: descriptor.position,
            });
            artifacts.push(artifact);
        }

        let root = aggregator::build_aggregator(AGGREGATOR_NAME, &job.summary, &placed)?;
        artifacts.push(GeneratedArtifact::aggregator(AGGREGATOR_NAME.into(), root));
        let sink = &self.sink;
        let manifest = aggregator::build_manifest(&job.id, &artifacts, |a| sink.file_name(a))?;
        artifacts.push(GeneratedArtifact::manifest(MANIFEST_NAME.into(), manifest));

        let mut paths = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let path = self.sink.persist(&job.id, artifact).await?;
            self.events.send(JobEvent::ArtifactPersisted {
                name: artifact.name.clone(),
                path: path.clone(),
            });
            paths.push(path);
        }

        let fallbacks = artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::Fallback)
            .count();
        let mean_quality = aggregator::mean_element_quality(&artifacts);
        self.events.send(JobEvent::JobCompleted {
            job_id: job.id.clone(),
            artifacts: artifacts.len(),
            fallbacks,
            mean_quality,
            timestamp: chrono::Utc::now(),
        });
        tracing::info!(
            job_id = %job.id,
            artifacts = artifacts.len(),
            fallbacks,
            mean_quality,
            "job completed"
        );

        Ok(JobReport {
            job_id: job.id.clone(),
            artifacts,
            paths,
            fallbacks,
            mean_quality,
        })
    }

    /// Exactly one artifact for `descriptor`: optimized when the pipeline
    /// succeeds, fallback otherwise.
    pub fn process_element(&self, descriptor: &ElementDescriptor, name: String) -> ForgeResult<GeneratedArtifact> {
        match self.optimize_and_materialize(descriptor, &name) {
            Ok(artifact) => Ok(artifact),
            Err(e) => {
                tracing::warn!(element_id = %descriptor.id, name = %name, error = %e, "element fell back");
                self.events.send(JobEvent::ElementFellBack {
                    element_id: descriptor.id.clone(),
                    name: name.clone(),
                    error: e.to_string(),
                });
                let source = materializer::materialize_fallback(descriptor, &name)?;
                Ok(GeneratedArtifact::fallback(name, &descriptor.id, source))
            }
        }
    }

    fn optimize_and_materialize(&self, descriptor: &ElementDescriptor, name: &str) -> ForgeResult<GeneratedArtifact> {
        let outcome = self.optimizer.optimize(descriptor)?;
        let best = Candidate {
            name: name.to_string(),
            ..outcome.best
        };
        let source = materializer::materialize(&best)?;

        tracing::info!(
            element_id = %descriptor.id,
            name = %best.name,
            quality = best.quality,
            iteration = best.iterations_used,
            status = outcome.status.label(),
            "element optimized"
        );
        self.events.send(JobEvent::ElementOptimized {
            element_id: descriptor.id.clone(),
            name: best.name.clone(),
            quality: best.quality,
            iterations: best.iterations_used,
            status: outcome.status.label().to_string(),
        });
        Ok(GeneratedArtifact::element(
            best.name,
            &descriptor.id,
            source,
            best.quality,
            best.iterations_used,
        ))
    }
}

/// `base`, or `base` with the smallest numeric suffix not yet taken.
fn unique_name(taken: &mut HashSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::sink::FsArtifactSink;
    use crate::config::{OptimizerConfig, OutputConfig};
    use crate::errors::ForgeError;
    use crate::optimizer::Catalogue;
    use crate::perception::job_file::JsonJobSource;
    use crate::perception::types::{ElementProperties, Position};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        stored: Mutex<Vec<(String, GeneratedArtifact)>>,
    }

    #[async_trait]
    impl ArtifactSink for MemorySink {
        async fn prepare(&self, _job_id: &str) -> ForgeResult<()> {
            Ok(())
        }

        async fn persist(&self, job_id: &str, artifact: &GeneratedArtifact) -> ForgeResult<PathBuf> {
            self.stored
                .lock()
                .unwrap()
                .push((job_id.to_string(), artifact.clone()));
            Ok(PathBuf::from(job_id).join(self.file_name(artifact)))
        }

        fn file_name(&self, artifact: &GeneratedArtifact) -> String {
            format!("{}.out", artifact.name)
        }
    }

    struct UnwritableSink;

    #[async_trait]
    impl ArtifactSink for UnwritableSink {
        async fn prepare(&self, job_id: &str) -> ForgeResult<()> {
            Err(ForgeError::Persistence(format!("cannot create {job_id}")))
        }

        async fn persist(&self, _job_id: &str, _artifact: &GeneratedArtifact) -> ForgeResult<PathBuf> {
            unreachable!("nothing is persisted when prepare fails")
        }

        fn file_name(&self, artifact: &GeneratedArtifact) -> String {
            artifact.name.clone()
        }
    }

    fn orchestrator(sink: Arc<dyn ArtifactSink>) -> BatchOrchestrator {
        let optimizer = Optimizer::new(Arc::new(Catalogue::builtin()), OptimizerConfig::default());
        BatchOrchestrator::new(optimizer, sink)
    }

    fn descriptor(id: &str, kind: &str, width: f64, height: f64) -> ElementDescriptor {
        ElementDescriptor {
            id: id.into(),
            element_type: kind.into(),
            properties: ElementProperties::default(),
            position: Some(Position { x: 0.0, y: 0.0, width, height }),
            defect: None,
        }
    }

    fn three_element_job() -> Job {
        let mut button = descriptor("e1", "button", 120.0, 40.0);
        button.properties.text = Some("Save".into());
        button.properties.background_color = Some("#1976d2".into());
        Job {
            id: "job-1".into(),
            elements: vec![
                button,
                descriptor("e2", "card", -50.0, 100.0),
                descriptor("e3", "text", 200.0, 30.0),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn malformed_descriptor_falls_back_without_aborting() {
        let sink = Arc::new(MemorySink::default());
        let report = orchestrator(sink.clone()).run_job(&three_element_job()).await.unwrap();

        let elements: Vec<_> = report.element_artifacts().collect();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].kind, ArtifactKind::Fallback);
        assert_eq!(elements[1].quality, 0.1);
        assert_eq!(elements[1].iterations, 0);
        assert_eq!(report.fallbacks, 1);

        assert_eq!(elements[0].name, "ButtonE1");
        assert!(elements[0].quality > 0.3);
        assert!(elements[0].source_text.contains("\"Save\""));

        // three elements, aggregator, manifest
        let stored = sink.stored.lock().unwrap();
        assert_eq!(stored.len(), 5);
        assert!(stored.iter().all(|(job, _)| job == "job-1"));
        assert_eq!(stored[3].1.kind, ArtifactKind::Aggregator);
        assert_eq!(stored[3].1.quality, 1.0);
        assert_eq!(stored[4].1.kind, ArtifactKind::Manifest);
        assert!(stored[4].1.source_text.contains("\"CardE2.out\""));
    }

    #[tokio::test]
    async fn null_width_in_job_file_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"id":"job-2","elements":[
                {"id":"a","type":"button","properties":{"text":"Save"},"position":{"x":0,"y":0,"width":120,"height":40}},
                {"id":"b","type":"card","position":{"x":10,"y":10,"width":null,"height":80}},
                {"id":"c","type":"text","properties":{"text":"Hi"},"position":{"x":0,"y":60,"width":80,"height":20}}
            ]}"#,
        )
        .unwrap();

        let sink = Arc::new(MemorySink::default());
        let orch = orchestrator(sink.clone());
        let mut rx = orch.events().subscribe();
        let report = orch.run(&JsonJobSource::new(&path)).await.unwrap();

        let elements: Vec<_> = report.element_artifacts().collect();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].name, "CardB");
        assert_eq!(elements[1].kind, ArtifactKind::Fallback);
        assert_eq!(elements[1].quality, 0.1);
        assert_eq!(elements[1].iterations, 0);
        assert_eq!(elements[0].kind, ArtifactKind::Element);
        assert_eq!(elements[2].kind, ArtifactKind::Element);
        assert_eq!(sink.stored.lock().unwrap().len(), 5);

        let mut fell_back = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let JobEvent::ElementFellBack { element_id, .. } = event {
                fell_back.push(element_id);
            }
        }
        assert_eq!(fell_back, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn unpreparable_location_fails_the_job() {
        let err = orchestrator(Arc::new(UnwritableSink))
            .run_job(&three_element_job())
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Persistence(_)));
    }

    #[tokio::test]
    async fn duplicate_names_get_suffixes() {
        let job = Job {
            id: "dup".into(),
            elements: vec![
                descriptor("1", "card", 100.0, 100.0),
                descriptor("1", "card", 100.0, 100.0),
                descriptor("", "app", 10.0, 10.0),
            ],
            ..Default::default()
        };
        let report = orchestrator(Arc::new(MemorySink::default())).run_job(&job).await.unwrap();
        let names: Vec<_> = report.element_artifacts().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Card1", "Card12", "App2"]);
    }

    #[tokio::test]
    async fn events_bracket_the_job() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let orch = orchestrator(Arc::new(MemorySink::default())).with_events(bus);
        orch.run_job(&three_element_job()).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events.first(), Some(JobEvent::JobStarted { elements: 3, .. })));
        assert!(matches!(events.last(), Some(JobEvent::JobCompleted { fallbacks: 1, artifacts: 5, .. })));
        assert_eq!(
            events.iter().filter(|e| matches!(e, JobEvent::ElementFellBack { .. })).count(),
            1
        );
        assert_eq!(
            events.iter().filter(|e| matches!(e, JobEvent::ArtifactPersisted { .. })).count(),
            5
        );
    }

    #[tokio::test]
    async fn writes_job_directory_to_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(OutputConfig {
            directory: tmp.path().to_path_buf(),
            ..OutputConfig::default()
        });
        let report = orchestrator(Arc::new(sink)).run_job(&three_element_job()).await.unwrap();

        let dir = tmp.path().join("job-1");
        for name in ["ButtonE1.tsx", "CardE2.tsx", "TextE3.tsx", "App.tsx", "manifest.json"] {
            assert!(dir.join(name).is_file(), "{name} missing");
        }
        assert_eq!(report.paths.len(), 5);

        let manifest: aggregator::Manifest =
            serde_json::from_str(&std::fs::read_to_string(dir.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest.artifacts.len(), 4);
        assert!((manifest.mean_quality - report.mean_quality).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_job_still_emits_aggregator_and_manifest() {
        let job = Job {
            id: "empty".into(),
            ..Default::default()
        };
        let report = orchestrator(Arc::new(MemorySink::default())).run_job(&job).await.unwrap();
        assert_eq!(report.artifacts.len(), 2);
        assert_eq!(report.mean_quality, 0.0);
    }
}
