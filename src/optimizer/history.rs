use super::fuzzy::ControllerState;
use crate::config::{CrossoverMethod, SelectionMethod};
use crate::core_types::Genome;
use crate::fitness::{FitnessStats, LayoutEvaluation};
use crate::site::Grid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A layout singled out as best of its generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestLayout {
    pub run: usize,
    pub genome: Genome,
    pub cell_ids: Vec<u32>,
    pub energy: f64,
    pub efficiency: f64,
    pub fitness: f64,
}

impl BestLayout {
    pub fn from_evaluation(eval: &LayoutEvaluation, grid: &Grid) -> Self {
        Self {
            run: eval.run,
            genome: eval.genome.clone(),
            cell_ids: grid.ids_of(&eval.genome.occupied()),
            energy: eval.energy,
            efficiency: eval.efficiency,
            fitness: eval.fitness,
        }
    }
}

/// Operator parameters in force for a generation's breeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSnapshot {
    pub selection_method: SelectionMethod,
    pub selection_fraction: f64,
    pub crossover_method: CrossoverMethod,
    pub crossover_points: usize,
    pub mutation_rate: f64,
    pub trim_force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingSizes {
    pub survivors: usize,
    pub offspring: usize,
    /// Bits flipped by mutation.
    pub mutated_bits: usize,
    /// Bits changed by repair.
    pub repaired_bits: usize,
    pub elites: usize,
    pub reinjected: usize,
    pub next_population: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSizes {
    pub population: usize,
    pub unique_runs: usize,
    /// `None` on the generation that terminated the loop.
    pub breeding: Option<BreedingSizes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub energy: FitnessStats,
    pub efficiency: FitnessStats,
    pub fitness: FitnessStats,
    pub best_by_energy: BestLayout,
    pub best_by_efficiency: BestLayout,
    pub controller: ControllerState,
    pub operators: OperatorSnapshot,
    pub sizes: StageSizes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    FullEfficiency,
    MaxIterations,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FullEfficiency => write!(f, "best layout reached 100% efficiency"),
            StopReason::MaxIterations => write!(f, "iteration limit reached"),
        }
    }
}

/// Append-only record of a whole optimization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunHistory {
    records: Vec<GenerationRecord>,
    stop_reason: Option<StopReason>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    pub(crate) fn finish(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
    }

    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Best layout by energy over every generation; earliest wins ties.
    pub fn best_by_energy(&self) -> Option<&BestLayout> {
        self.records
            .iter()
            .map(|r| &r.best_by_energy)
            .fold(None, |acc: Option<&BestLayout>, b| match acc {
                Some(a) if a.energy >= b.energy => Some(a),
                _ => Some(b),
            })
    }

    pub fn best_by_efficiency(&self) -> Option<&BestLayout> {
        self.records
            .iter()
            .map(|r| &r.best_by_efficiency)
            .fold(None, |acc: Option<&BestLayout>, b| match acc {
                Some(a) if a.efficiency >= b.efficiency => Some(a),
                _ => Some(b),
            })
    }
}
