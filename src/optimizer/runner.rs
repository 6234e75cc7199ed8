use super::crossover::recombine;
use super::fuzzy::{AdaptiveController, OperatorPlan};
use super::history::{
    BestLayout, BreedingSizes, GenerationRecord, OperatorSnapshot, RunHistory, StageSizes,
    StopReason,
};
use super::mutation::{initial_population, mutate};
use super::repair::{repair, CellWeights};
use super::selection::select;
use crate::config::Config;
use crate::consts::{EFFICIENCY_TOLERANCE, FULL_EFFICIENCY};
use crate::core_types::Genome;
use crate::error::WfResult;
use crate::fitness::{FitnessEvaluator, PopulationEvaluation};
use crate::site::{Grid, TerrainContext, WindScenario};
use crate::wake::WakeModel;
use fastrand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

/// Receives every generation record as soon as it is appended.
pub trait ProgressCallback: Send + Sync {
    fn on_generation(&self, record: &GenerationRecord);
}

impl<F> ProgressCallback for F
where
    F: Fn(&GenerationRecord) + Send + Sync,
{
    fn on_generation(&self, record: &GenerationRecord) {
        self(record)
    }
}

/// Callback that ignores progress.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_generation(&self, _record: &GenerationRecord) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Init,
    Iterate(usize),
    Terminated(StopReason),
}

#[derive(TypedBuilder)]
pub struct LayoutOptimizer {
    #[builder(setter(into))]
    pub grid: Arc<Grid>,
    #[builder(setter(into))]
    pub scenario: Arc<WindScenario>,
    #[builder(default, setter(into))]
    pub terrain: Arc<TerrainContext>,
    #[builder(default)]
    pub config: Config,
}

/// Everything one generation's breeding needs besides the population itself.
struct BreedContext<'a> {
    plan: &'a OperatorPlan,
    standalone: &'a [f64],
}

impl LayoutOptimizer {
    /// Builds the fitness evaluator after checking the configuration against the grid.
    pub fn evaluator(&self) -> WfResult<FitnessEvaluator> {
        self.config.validate(self.grid.len())?;
        let model = WakeModel::new(&self.config.turbine)?;
        FitnessEvaluator::new(
            self.grid.clone(),
            self.scenario.clone(),
            self.terrain.clone(),
            model,
            self.config.search.objective,
        )?
        .with_workers(self.config.search.workers)
    }

    /// Runs the generation loop to completion.
    ///
    /// Configuration problems surface before the first generation; an
    /// evaluation error aborts the run.
    pub fn run<CB: ProgressCallback>(&self, seed: Option<u64>, callback: CB) -> WfResult<RunHistory> {
        let search = &self.config.search;
        let mut rng = match seed {
            Some(s) => Rng::with_seed(s),
            None => Rng::new(),
        };

        let mut history = RunHistory::new();
        let mut state = LoopState::Init;
        let mut population: Vec<Genome> = Vec::new();

        let evaluator = self.evaluator()?;
        let standalone = evaluator.standalone_energy();
        let mut controller =
            AdaptiveController::new(self.config.fuzzy.clone(), self.config.operators.selection_method);

        loop {
            state = match state {
                LoopState::Init => {
                    info!(
                        "Starting search: {} cells, {} wind directions, {} turbines, {} iterations",
                        self.grid.len(),
                        self.scenario.len(),
                        search.turbines,
                        search.max_iterations
                    );
                    population = initial_population(
                        &mut rng,
                        self.grid.len(),
                        search.turbines,
                        search.initial_population,
                    );
                    LoopState::Iterate(1)
                }
                LoopState::Iterate(generation) => {
                    let eval = evaluator.evaluate_population(&population)?;
                    let plan = controller.observe(generation, &eval);

                    let best_efficiency = eval.best_by_efficiency().efficiency;
                    let stop = if search.stop_on_full_efficiency
                        && best_efficiency >= FULL_EFFICIENCY - EFFICIENCY_TOLERANCE
                    {
                        Some(StopReason::FullEfficiency)
                    } else if generation >= search.max_iterations {
                        Some(StopReason::MaxIterations)
                    } else {
                        None
                    };

                    let breeding = if stop.is_none() {
                        let ctx = BreedContext {
                            plan: &plan,
                            standalone: &standalone,
                        };
                        let (next, sizes) = self.breed(&eval, &ctx, &mut rng);
                        Some((next, sizes))
                    } else {
                        None
                    };

                    let record = self.record(generation, &population, &eval, plan, breeding.as_ref().map(|b| b.1));
                    debug!(
                        "Generation {}: energy max {:.1} mean {:.1}, efficiency max {:.3}%, {} unique runs",
                        generation,
                        record.energy.max,
                        record.energy.mean,
                        record.efficiency.max,
                        record.sizes.unique_runs
                    );
                    callback.on_generation(&record);
                    history.push(record);

                    match (stop, breeding) {
                        (Some(reason), _) => LoopState::Terminated(reason),
                        (None, Some((next, _))) => {
                            population = next;
                            LoopState::Iterate(generation + 1)
                        }
                        (None, None) => LoopState::Terminated(StopReason::MaxIterations),
                    }
                }
                LoopState::Terminated(reason) => {
                    info!("Search finished after {} generations: {}", history.len(), reason);
                    history.finish(reason);
                    return Ok(history);
                }
            };
        }
    }

    /// select → crossover → mutate → repair, then elites and re-injections.
    fn breed(
        &self,
        eval: &PopulationEvaluation,
        ctx: &BreedContext<'_>,
        rng: &mut Rng,
    ) -> (Vec<Genome>, BreedingSizes) {
        let ops = &self.config.operators;
        let max_population = self.config.search.max_population;

        let survivors = select(&eval.runs, ctx.plan.selection_fraction, ops.elitism, ops.elite_count);
        if survivors.len() == 1 {
            warn!("Population collapsed to a single survivor; passing it through crossover");
        }

        let elite_count = if ops.elitism {
            ops.elite_count.min(max_population.saturating_sub(1))
        } else {
            0
        };
        let elites: Vec<Genome> = survivors
            .iter()
            .take(elite_count)
            .map(|s| s.genome.clone())
            .collect();

        let parents: Vec<Genome> = survivors.iter().map(|s| s.genome.clone()).collect();
        let cap = max_population.saturating_sub(elites.len()).max(1);
        let mut offspring = recombine(
            &parents,
            ctx.plan.crossover_points,
            ops.crossover_method,
            cap,
            rng,
        );

        let mutated_bits = mutate(&mut offspring, ops.mutation_rate, rng);
        let weights = CellWeights::from_evaluations(&eval.runs, ctx.standalone);
        let repaired_bits = repair(
            &mut offspring,
            self.config.search.turbines,
            &weights,
            ops.trim_force,
            rng,
        );

        let mut sizes = BreedingSizes {
            survivors: survivors.len(),
            offspring: offspring.len(),
            mutated_bits,
            repaired_bits,
            elites: elites.len(),
            reinjected: ctx.plan.reinject.len(),
            next_population: 0,
        };

        let mut next = elites;
        next.append(&mut offspring);
        next.extend(ctx.plan.reinject.iter().cloned());
        sizes.next_population = next.len();

        (next, sizes)
    }

    fn record(
        &self,
        generation: usize,
        population: &[Genome],
        eval: &PopulationEvaluation,
        plan: OperatorPlan,
        breeding: Option<BreedingSizes>,
    ) -> GenerationRecord {
        let ops = &self.config.operators;
        GenerationRecord {
            generation,
            energy: eval.energy_stats(),
            efficiency: eval.efficiency_stats(),
            fitness: eval.fitness_stats(),
            best_by_energy: BestLayout::from_evaluation(eval.best_by_energy(), &self.grid),
            best_by_efficiency: BestLayout::from_evaluation(eval.best_by_efficiency(), &self.grid),
            operators: OperatorSnapshot {
                selection_method: ops.selection_method,
                selection_fraction: plan.selection_fraction,
                crossover_method: ops.crossover_method,
                crossover_points: plan.crossover_points,
                mutation_rate: ops.mutation_rate,
                trim_force: ops.trim_force,
            },
            controller: plan.state,
            sizes: StageSizes {
                population: population.len(),
                unique_runs: eval.unique_count(),
                breeding,
            },
        }
    }
}
