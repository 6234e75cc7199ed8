//! Adaptive ("fuzzy") control of selection pressure and crossover granularity.
//!
//! The controller watches the max/mean/min fitness trend between
//! generations. A deteriorating population tightens selection and coarsens
//! crossover; an improving one relaxes selection and refines crossover.
//! Two recovery rules sit on top: a diversity boost when the number of
//! unique Runs collapses, and re-injection of the all-time best layouts when
//! the best energy has not been matched for a while.

use crate::config::{FuzzyParams, SelectionMethod};
use crate::core_types::Genome;
use crate::fitness::{FitnessStats, PopulationEvaluation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Relative slack when deciding whether a generation matched the best energy.
const BEST_MATCH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improved,
    Deteriorated,
}

/// Snapshot of the controller after one update, stored in each generation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub selection_divisor: f64,
    pub crossover_points: usize,
    pub trend: Option<Trend>,
    pub weighted_delta: Option<f64>,
    pub floor_hit: bool,
    pub diversity_boost: bool,
    pub stagnant: bool,
    pub best_energy: f64,
    pub best_efficiency: f64,
    pub last_best_generation: usize,
}

/// What the breeding stages of this generation should use.
#[derive(Debug, Clone)]
pub struct OperatorPlan {
    pub selection_fraction: f64,
    pub crossover_points: usize,
    /// Genomes to append to the next population as extra Runs.
    pub reinject: Vec<Genome>,
    pub state: ControllerState,
}

#[derive(Debug, Clone)]
struct Champion {
    genome: Genome,
    value: f64,
}

pub struct AdaptiveController {
    params: FuzzyParams,
    method: SelectionMethod,
    divisor: f64,
    cross_points: usize,
    previous: Option<FitnessStats>,
    best_energy: Option<Champion>,
    best_efficiency: Option<Champion>,
    last_best_generation: usize,
}

impl AdaptiveController {
    pub fn new(params: FuzzyParams, method: SelectionMethod) -> Self {
        let divisor = params
            .divisor_initial
            .clamp(params.divisor_floor, params.divisor_ceiling);
        let cross_points = params
            .cross_points_initial
            .clamp(params.cross_points_min, params.cross_points_max);
        Self {
            params,
            method,
            divisor,
            cross_points,
            previous: None,
            best_energy: None,
            best_efficiency: None,
            last_best_generation: 0,
        }
    }

    pub fn selection_divisor(&self) -> f64 {
        self.divisor
    }

    pub fn crossover_points(&self) -> usize {
        self.cross_points
    }

    /// Share of unique Runs kept by `VAR` selection at the current divisor.
    pub fn tuned_fraction(&self) -> f64 {
        1.0 - 1.0 / self.divisor
    }

    /// All-time best genome by energy seen so far.
    pub fn best_energy_genome(&self) -> Option<&Genome> {
        self.best_energy.as_ref().map(|c| &c.genome)
    }

    pub fn best_efficiency_genome(&self) -> Option<&Genome> {
        self.best_efficiency.as_ref().map(|c| &c.genome)
    }

    fn weighted_delta(&self, prev: &FitnessStats, cur: &FitnessStats) -> f64 {
        let p = &self.params;
        p.weight_max * (cur.max - prev.max)
            + p.weight_mean * (cur.mean - prev.mean)
            + p.weight_min * (cur.min - prev.min)
    }

    /// Moves divisor and crossover points one step. Returns whether the floor was hit.
    fn apply_trend(&mut self, trend: Trend) -> bool {
        let p = &self.params;
        match trend {
            Trend::Deteriorated => {
                let tightened = self.divisor - p.divisor_step;
                self.divisor = tightened.max(p.divisor_floor);
                self.cross_points = self
                    .cross_points
                    .saturating_sub(1)
                    .max(p.cross_points_min);
                tightened <= p.divisor_floor
            }
            Trend::Improved => {
                self.divisor = (self.divisor + p.divisor_step).min(p.divisor_ceiling);
                self.cross_points = (self.cross_points + 1).min(p.cross_points_max);
                false
            }
        }
    }

    fn track_champions(&mut self, generation: usize, eval: &PopulationEvaluation) {
        let by_energy = eval.best_by_energy();
        match self.best_energy.as_ref().map(|c| c.value) {
            Some(best) if by_energy.energy <= best => {
                let slack = BEST_MATCH_TOLERANCE * best.abs().max(1.0);
                if by_energy.energy >= best - slack {
                    self.last_best_generation = generation;
                }
            }
            _ => {
                self.best_energy = Some(Champion {
                    genome: by_energy.genome.clone(),
                    value: by_energy.energy,
                });
                self.last_best_generation = generation;
            }
        }

        let by_eff = eval.best_by_efficiency();
        let better = self
            .best_efficiency
            .as_ref()
            .map_or(true, |best| by_eff.efficiency > best.value);
        if better {
            self.best_efficiency = Some(Champion {
                genome: by_eff.genome.clone(),
                value: by_eff.efficiency,
            });
        }
    }

    fn is_stagnant(&self, generation: usize) -> bool {
        generation > self.params.stagnation_start
            && generation.saturating_sub(self.last_best_generation) >= self.params.stagnation_window
    }

    /// Updates the controller with generation `generation` (1-based) and plans its breeding.
    pub fn observe(&mut self, generation: usize, eval: &PopulationEvaluation) -> OperatorPlan {
        let stats = eval.fitness_stats();
        let delta = self.previous.map(|prev| self.weighted_delta(&prev, &stats));
        self.previous = Some(stats);

        let trend = delta.map(|d| {
            if d > 0.0 {
                Trend::Improved
            } else {
                Trend::Deteriorated
            }
        });
        let floor_hit = trend.map_or(false, |t| self.apply_trend(t));

        self.track_champions(generation, eval);

        let diversity_boost = eval.unique_count() <= self.params.diversity_threshold;
        let stagnant = self.is_stagnant(generation);

        let selection_fraction = if diversity_boost {
            1.0
        } else {
            match self.method {
                SelectionMethod::Var => self.tuned_fraction(),
                SelectionMethod::Fix => {
                    if floor_hit {
                        0.5
                    } else {
                        1.0
                    }
                }
            }
        };

        let crossover_points = if diversity_boost {
            self.cross_points + self.params.cross_points_boost
        } else {
            self.cross_points
        };

        let mut reinject = Vec::new();
        if stagnant {
            if let (Some(e), Some(f)) = (&self.best_energy, &self.best_efficiency) {
                info!(
                    "Generation {}: best energy {:.1} not matched since generation {}, re-injecting champions",
                    generation, e.value, self.last_best_generation
                );
                reinject.push(e.genome.clone());
                reinject.push(f.genome.clone());
            }
        }

        if diversity_boost {
            debug!(
                "Generation {}: {} unique runs, full selection with {} crossover points",
                generation,
                eval.unique_count(),
                crossover_points
            );
        }

        let state = ControllerState {
            selection_divisor: self.divisor,
            crossover_points: self.cross_points,
            trend,
            weighted_delta: delta,
            floor_hit,
            diversity_boost,
            stagnant,
            best_energy: self.best_energy.as_ref().map_or(0.0, |c| c.value),
            best_efficiency: self.best_efficiency.as_ref().map_or(0.0, |c| c.value),
            last_best_generation: self.last_best_generation,
        };

        OperatorPlan {
            selection_fraction,
            crossover_points,
            reinject,
            state,
        }
    }
}
