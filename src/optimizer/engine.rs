use std::sync::Arc;

use crate::config::OptimizerConfig;
use crate::errors::{ForgeError, ForgeResult};
use crate::optimizer::catalogue::Catalogue;
use crate::optimizer::loop_control::{max_iterations, LoopController};
use crate::optimizer::normalizer::normalize;
use crate::optimizer::state::{Candidate, OptimizationOutcome};
use crate::optimizer::{quality, variants};
use crate::perception::types::ElementDescriptor;

/// Bounded, stagnation-aware local search over parameter perturbations.
///
/// Pure CPU work: no I/O and no suspension points. Cost is bounded by the
/// iteration budget times the number of variants per iteration.
pub struct Optimizer {
    catalogue: Arc<Catalogue>,
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(catalogue: Arc<Catalogue>, config: OptimizerConfig) -> Self {
        Self { catalogue, config }
    }

    /// Starting point of the search: the normalized descriptor with the fixed
    /// base quality, before any evaluation.
    pub fn base_candidate(&self, descriptor: &ElementDescriptor) -> Candidate {
        Candidate {
            id: descriptor.id.clone(),
            element_type: descriptor.element_type.clone(),
            component_type: self.catalogue.component_type(&descriptor.element_type),
            name: descriptor.component_name(),
            parameters: normalize(descriptor),
            quality: self.config.base_quality,
            iterations_used: 0,
        }
    }

    pub fn optimize(&self, descriptor: &ElementDescriptor) -> ForgeResult<OptimizationOutcome> {
        descriptor.validate()?;

        let complexity = variants::complexity_score(descriptor);
        let class = variants::complexity_class(complexity);
        let budget = max_iterations(class);
        let keys = self.catalogue.key_parameters(&descriptor.element_type);
        let selected = variants::select_parameters(keys, complexity);

        let mut best = self.base_candidate(descriptor);
        let mut ctrl = LoopController::new(self.config.clone(), budget, best.quality);
        let mut trace = Vec::with_capacity(budget as usize);

        tracing::debug!(
            element_id = %descriptor.id,
            complexity,
            ?class,
            budget,
            parameters = ?selected,
            "optimization started"
        );

        'search: while let Some(iteration) = ctrl.next_iteration() {
            let intensity = ctrl.intensity();
            let mut improved = false;

            for params in variants::generate(&best.parameters, selected, intensity) {
                let q = quality::evaluate(&params, descriptor);
                if q <= best.quality {
                    continue;
                }
                best = best.derive(params, q, iteration);
                improved = true;
                if ctrl.reaches_threshold(q) {
                    ctrl.stop_at_threshold(q);
                    trace.push(best.quality);
                    break 'search;
                }
            }

            let status = ctrl.finish_iteration(improved, best.quality);
            trace.push(best.quality);
            tracing::debug!(
                element_id = %descriptor.id,
                iteration,
                intensity,
                best_quality = best.quality,
                stagnation = ctrl.stagnation(),
                ?status,
                "iteration finished"
            );
        }

        if !(0.0..=1.0).contains(&best.quality) {
            return Err(ForgeError::Optimization(format!(
                "element '{}' finished with quality {} outside [0, 1]",
                descriptor.id, best.quality
            )));
        }

        let status = ctrl.status();
        tracing::info!(
            element_id = %descriptor.id,
            component = ?best.component_type,
            quality = best.quality,
            iterations_used = best.iterations_used,
            ?status,
            "optimization finished"
        );

        Ok(OptimizationOutcome {
            best,
            status,
            max_iterations: budget,
            iterations_run: ctrl.iteration(),
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::catalogue::{ComponentType, Parameter};
    use crate::optimizer::state::SearchStatus;
    use crate::perception::types::{ElementProperties, Position};
    use std::collections::HashMap;

    fn optimizer() -> Optimizer {
        Optimizer::new(Arc::new(Catalogue::builtin()), OptimizerConfig::default())
    }

    fn sized(id: &str, kind: &str, width: f64, height: f64) -> ElementDescriptor {
        ElementDescriptor {
            id: id.into(),
            element_type: kind.into(),
            position: Some(Position { x: 0.0, y: 0.0, width, height }),
            ..Default::default()
        }
    }

    #[test]
    fn matching_descriptor_reaches_threshold_early() {
        let mut d = sized("m1", "chart", 300.0, 200.0);
        d.properties = ElementProperties {
            title: Some("Sales".into()),
            color: Some("#1976d2".into()),
            background_color: Some("#ffffff".into()),
            text_color: Some("#000000".into()),
            font_size: Some("14px".into()),
            font_weight: Some("400".into()),
            ..Default::default()
        };

        let out = optimizer().optimize(&d).unwrap();
        assert!(out.best.quality >= 0.95, "quality {}", out.best.quality);
        assert!(matches!(out.status, SearchStatus::ThresholdReached { .. }));
        assert!(out.iterations_run < out.max_iterations);
        assert_eq!(out.best.iterations_used, out.iterations_run);
    }

    #[test]
    fn button_scenario_beats_base_quality() {
        let mut d = sized("e1", "button", 120.0, 40.0);
        d.properties.text = Some("Save".into());
        d.properties.background_color = Some("#1976d2".into());

        let out = optimizer().optimize(&d).unwrap();
        assert!(out.best.quality > 0.3);
        assert_eq!(out.best.name, "ButtonE1");
        assert_eq!(out.best.component_type, ComponentType::Button);
        assert_eq!(out.best.parameters.text, "Save");
    }

    #[test]
    fn quality_trace_never_regresses() {
        for (kind, w, h) in [("card", 250.0, 180.0), ("table", 640.0, 480.0), ("text", 80.0, 20.0)] {
            let mut d = sized("t", kind, w, h);
            d.properties.color = Some("#336699".into());
            d.properties.font_size = Some("17px".into());
            let out = optimizer().optimize(&d).unwrap();
            assert!(out.trace.windows(2).all(|p| p[1] >= p[0]), "{kind}: {:?}", out.trace);
            assert!(out.best.iterations_used <= out.max_iterations);
            assert!((0.0..=1.0).contains(&out.best.quality));
        }
    }

    #[test]
    fn stagnation_reports_last_improving_iteration() {
        // Only the background colour is tunable and it already matches, so
        // iteration 1 lifts the base quality and nothing improves afterwards.
        let catalogue = Catalogue::new(
            HashMap::from([("swatch".to_string(), ComponentType::Container)]),
            HashMap::from([("swatch".to_string(), vec![Parameter::BackgroundColor])]),
            vec![],
        );
        let opt = Optimizer::new(Arc::new(catalogue), OptimizerConfig::default());
        let mut d = sized("s1", "swatch", 50.0, 50.0);
        d.properties.background_color = Some("#ff8800".into());

        let out = opt.optimize(&d).unwrap();
        assert_eq!(out.status, SearchStatus::Stagnant { iteration: 4 });
        assert_eq!(out.iterations_run, 4);
        assert!(out.iterations_run < out.max_iterations);
        assert_eq!(out.best.iterations_used, 1);
    }

    #[test]
    fn never_improving_search_keeps_base_candidate() {
        let catalogue = Catalogue::new(HashMap::new(), HashMap::new(), vec![]);
        let opt = Optimizer::new(
            Arc::new(catalogue),
            OptimizerConfig { base_quality: 0.99, quality_threshold: 1.5, ..Default::default() },
        );
        let out = opt.optimize(&sized("n", "x", 10.0, 10.0)).unwrap();
        assert_eq!(out.best.iterations_used, 0);
        assert_eq!(out.best.quality, 0.99);
        assert!(matches!(out.status, SearchStatus::Stagnant { .. }));
    }

    #[test]
    fn unknown_type_optimizes_as_generic() {
        let out = optimizer().optimize(&sized("u", "hologram", 100.0, 100.0)).unwrap();
        assert_eq!(out.best.component_type, ComponentType::Generic);
        assert_eq!(out.best.name, "HologramU");
    }

    #[test]
    fn negative_width_is_rejected() {
        let err = optimizer().optimize(&sized("bad", "card", -20.0, 40.0)).unwrap_err();
        assert!(matches!(err, ForgeError::Descriptor(_)));
    }
}
