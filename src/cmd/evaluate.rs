use crate::reports;
use clap::Args;
use windforge::config::Config;
use windforge::core_types::Genome;
use windforge::error::{WfResult, WindForgeError};
use windforge::optimizer::LayoutOptimizer;
use windforge::site::{Grid, TerrainContext, WindScenario};

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Occupied cell ids, comma separated.
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub cells: Vec<u32>,
}

pub fn run(
    args: &EvaluateArgs,
    mut config: Config,
    grid: Grid,
    scenario: WindScenario,
    terrain: TerrainContext,
) -> WfResult<()> {
    let indices = args
        .cells
        .iter()
        .map(|&id| {
            grid.index_of(id)
                .ok_or_else(|| WindForgeError::Validation(format!("unknown cell id {}", id)))
        })
        .collect::<WfResult<Vec<usize>>>()?;

    let genome = Genome::from_indices(grid.len(), &indices)?;
    // The layout is given, so the turbine count follows from it.
    config.search.turbines = genome.count_ones();

    let optimizer = LayoutOptimizer::builder()
        .grid(grid)
        .scenario(scenario)
        .terrain(terrain)
        .config(config)
        .build();

    let evaluation = optimizer.evaluator()?.evaluate_genome(&genome, 0)?;
    reports::print_evaluation(&evaluation, &optimizer.grid);
    Ok(())
}
