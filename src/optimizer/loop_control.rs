// Iteration budget, stagnation and threshold bookkeeping for the local search.
use crate::config::OptimizerConfig;
use crate::optimizer::state::SearchStatus;
use crate::optimizer::variants::ComplexityClass;

/// Iteration budget per complexity class.
pub fn max_iterations(class: ComplexityClass) -> u32 {
    match class {
        ComplexityClass::Simple => 5,
        ComplexityClass::Medium => 8,
        ComplexityClass::Complex => 12,
    }
}

pub struct LoopController {
    config: OptimizerConfig,
    max_iterations: u32,
    iteration: u32,
    stagnation: u32,
    best_quality: f64,
    status: SearchStatus,
}

impl LoopController {
    pub fn new(config: OptimizerConfig, max_iterations: u32, base_quality: f64) -> Self {
        Self {
            config,
            max_iterations,
            iteration: 0,
            stagnation: 0,
            best_quality: base_quality,
            status: SearchStatus::Running {
                iteration: 0,
                best_quality: base_quality,
                stagnation: 0,
            },
        }
    }

    /// Start the next iteration, or `None` once the search has terminated.
    pub fn next_iteration(&mut self) -> Option<u32> {
        if self.status.is_terminal() {
            return None;
        }
        if self.iteration >= self.max_iterations {
            self.status = SearchStatus::Exhausted {
                iteration: self.iteration,
            };
            return None;
        }
        self.iteration += 1;
        self.status = SearchStatus::Running {
            iteration: self.iteration,
            best_quality: self.best_quality,
            stagnation: self.stagnation,
        };
        Some(self.iteration)
    }

    /// Perturbation strength for the current iteration. Grows with progress
    /// through the budget and with every stagnant iteration.
    pub fn intensity(&self) -> f64 {
        let progress = self.iteration as f64 / self.max_iterations.max(1) as f64;
        (0.05 + 0.15 * progress + 0.05 * self.stagnation as f64).min(self.config.max_intensity)
    }

    /// True when `quality` is high enough to stop searching.
    pub fn reaches_threshold(&self, quality: f64) -> bool {
        quality >= self.config.quality_threshold
    }

    /// A variant crossed the threshold; the search ends on this iteration.
    pub fn stop_at_threshold(&mut self, quality: f64) -> SearchStatus {
        self.best_quality = self.best_quality.max(quality);
        self.status = SearchStatus::ThresholdReached {
            iteration: self.iteration,
        };
        self.status
    }

    /// Close the current iteration and decide whether the search goes on.
    pub fn finish_iteration(&mut self, improved: bool, best_quality: f64) -> SearchStatus {
        if improved {
            self.stagnation = 0;
            self.best_quality = best_quality;
            self.status = SearchStatus::Improved {
                iteration: self.iteration,
                best_quality,
            };
        } else {
            self.stagnation += 1;
            if self.stagnation >= self.config.stagnation_limit {
                self.status = SearchStatus::Stagnant {
                    iteration: self.iteration,
                };
                return self.status;
            }
            self.status = SearchStatus::Running {
                iteration: self.iteration,
                best_quality: self.best_quality,
                stagnation: self.stagnation,
            };
        }
        if self.iteration >= self.max_iterations {
            self.status = SearchStatus::Exhausted {
                iteration: self.iteration,
            };
        }
        self.status
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }
}
