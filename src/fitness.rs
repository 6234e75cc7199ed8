//! Probability-weighted energy evaluation of whole populations.
//!
//! Every unique genome of a generation becomes one *Run* and is evaluated
//! exactly once; duplicate genomes point at the same Run. Runs are
//! independent of each other and are evaluated in parallel with rayon.

use crate::config::Objective;
use crate::consts::HOURS_PER_YEAR;
use crate::core_types::Genome;
use crate::error::{WfResult, WindForgeError};
use crate::site::{Grid, TerrainContext, WindScenario};
use crate::wake::{efficiency, DirectionalYield, WakeModel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Expected annual energy of one occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellEnergy {
    pub cell: usize,
    pub energy: f64,
    pub potential: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEvaluation {
    pub run: usize,
    pub genome: Genome,
    pub directions: Vec<DirectionalYield>,
    pub cells: Vec<CellEnergy>,
    /// Expected annual energy, kWh.
    pub energy: f64,
    pub potential_energy: f64,
    /// Percent of the wake-free potential.
    pub efficiency: f64,
    pub fitness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitnessStats {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

impl FitnessStats {
    /// Order-independent max/mean/min reduction. Empty input yields zeros.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (max, min, sum, count) = values.into_iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY, 0.0, 0usize),
            |(mx, mn, s, c), v| (mx.max(v), mn.min(v), s + v, c + 1),
        );
        if count == 0 {
            return Self::default();
        }
        Self {
            max,
            mean: sum / count as f64,
            min,
        }
    }
}

/// All Runs of one generation plus the Run each population slot maps to.
#[derive(Debug, Clone)]
pub struct PopulationEvaluation {
    pub runs: Vec<LayoutEvaluation>,
    pub members: Vec<usize>,
}

impl PopulationEvaluation {
    pub fn unique_count(&self) -> usize {
        self.runs.len()
    }

    pub fn energy_stats(&self) -> FitnessStats {
        FitnessStats::from_values(self.runs.iter().map(|r| r.energy))
    }

    pub fn efficiency_stats(&self) -> FitnessStats {
        FitnessStats::from_values(self.runs.iter().map(|r| r.efficiency))
    }

    pub fn fitness_stats(&self) -> FitnessStats {
        FitnessStats::from_values(self.runs.iter().map(|r| r.fitness))
    }

    /// Highest energy; ties go to the earliest Run.
    pub fn best_by_energy(&self) -> &LayoutEvaluation {
        best_by(&self.runs, |r| r.energy)
    }

    pub fn best_by_efficiency(&self) -> &LayoutEvaluation {
        best_by(&self.runs, |r| r.efficiency)
    }
}

fn best_by<F: Fn(&LayoutEvaluation) -> f64>(runs: &[LayoutEvaluation], key: F) -> &LayoutEvaluation {
    let mut best = &runs[0];
    for r in &runs[1..] {
        if key(r) > key(best) {
            best = r;
        }
    }
    best
}

pub struct FitnessEvaluator {
    grid: Arc<Grid>,
    scenario: Arc<WindScenario>,
    terrain: Arc<TerrainContext>,
    model: WakeModel,
    objective: Objective,
    pool: Option<rayon::ThreadPool>,
}

impl FitnessEvaluator {
    pub fn new(
        grid: Arc<Grid>,
        scenario: Arc<WindScenario>,
        terrain: Arc<TerrainContext>,
        model: WakeModel,
        objective: Objective,
    ) -> WfResult<Self> {
        terrain.validate(&grid)?;
        model.check_terrain(&grid, &terrain)?;
        Ok(Self {
            grid,
            scenario,
            terrain,
            model,
            objective,
            pool: None,
        })
    }

    /// Runs evaluations on a dedicated pool of `workers` threads (0 keeps the global pool).
    pub fn with_workers(mut self, workers: usize) -> WfResult<Self> {
        if workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| WindForgeError::Config(format!("worker pool: {}", e)))?;
            self.pool = Some(pool);
        }
        Ok(self)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn model(&self) -> &WakeModel {
        &self.model
    }

    /// Evaluates one genome across every wind direction. Pure: no shared state.
    pub fn evaluate_genome(&self, genome: &Genome, run: usize) -> WfResult<LayoutEvaluation> {
        if genome.len() != self.grid.len() {
            return Err(WindForgeError::Evaluation(format!(
                "genome length {} does not match grid size {}",
                genome.len(),
                self.grid.len()
            )));
        }
        let occupied = genome.occupied();
        if occupied.is_empty() {
            return Err(WindForgeError::Evaluation(
                "layout has no occupied cells".to_string(),
            ));
        }

        let mut cells: Vec<CellEnergy> = occupied
            .iter()
            .map(|&cell| CellEnergy {
                cell,
                energy: 0.0,
                potential: 0.0,
            })
            .collect();

        let mut directions = Vec::with_capacity(self.scenario.len());
        let mut expected_power = 0.0;
        let mut expected_potential = 0.0;

        for case in self.scenario.cases() {
            let y = self
                .model
                .evaluate(&self.grid, &occupied, case, &self.terrain);
            let weight = case.probability / 100.0;

            expected_power += y.power * weight;
            expected_potential += y.potential_power * weight;
            for (acc, c) in cells.iter_mut().zip(&y.cells) {
                acc.energy += c.power * weight * HOURS_PER_YEAR;
                acc.potential += c.potential_power * weight * HOURS_PER_YEAR;
            }
            directions.push(y);
        }

        let energy = expected_power * HOURS_PER_YEAR;
        let potential_energy = expected_potential * HOURS_PER_YEAR;
        let eff = efficiency(energy, potential_energy);
        let fitness = match self.objective {
            Objective::Energy => energy,
            Objective::Efficiency => eff,
        };

        Ok(LayoutEvaluation {
            run,
            genome: genome.clone(),
            directions,
            cells,
            energy,
            potential_energy,
            efficiency: eff,
            fitness,
        })
    }

    /// Deduplicates the population into Runs and evaluates each Run once.
    pub fn evaluate_population(&self, population: &[Genome]) -> WfResult<PopulationEvaluation> {
        let mut index: HashMap<&Genome, usize> = HashMap::with_capacity(population.len());
        let mut unique: Vec<&Genome> = Vec::new();
        let mut members = Vec::with_capacity(population.len());

        for g in population {
            let run = *index.entry(g).or_insert_with(|| {
                unique.push(g);
                unique.len() - 1
            });
            members.push(run);
        }

        let work = || {
            unique
                .par_iter()
                .enumerate()
                .map(|(run, g)| self.evaluate_genome(g, run))
                .collect::<WfResult<Vec<_>>>()
        };

        let runs = match &self.pool {
            Some(pool) => pool.install(work)?,
            None => work()?,
        };

        Ok(PopulationEvaluation { runs, members })
    }

    /// Wake-free expected annual energy of a lone turbine on each cell.
    pub fn standalone_energy(&self) -> Vec<f64> {
        let base_elevation = if self.terrain.use_elevation {
            self.grid.base_elevation()
        } else {
            0.0
        };

        (0..self.grid.len())
            .map(|cell| {
                self.scenario
                    .cases()
                    .iter()
                    .map(|case| {
                        let v = self
                            .model
                            .free_speed(&self.grid, cell, case, &self.terrain, base_elevation);
                        self.model.curve.power(v) * case.probability / 100.0
                    })
                    .sum::<f64>()
                    * HOURS_PER_YEAR
            })
            .collect()
    }
}
