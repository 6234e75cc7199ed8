use crate::reports;
use clap::Args;
use std::fs;
use std::time::Instant;
use tracing::info;
use windforge::config::Config;
use windforge::error::WfResult;
use windforge::optimizer::{GenerationRecord, LayoutOptimizer};
use windforge::site::{Grid, TerrainContext, WindScenario};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Write the full generation history here as JSON.
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(
    args: &SearchArgs,
    config: Config,
    grid: Grid,
    scenario: WindScenario,
    terrain: TerrainContext,
    debug: bool,
) -> WfResult<()> {
    let optimizer = LayoutOptimizer::builder()
        .grid(grid)
        .scenario(scenario)
        .terrain(terrain)
        .config(config)
        .build();

    let start = Instant::now();
    let history = optimizer.run(args.seed, |r: &GenerationRecord| {
        if debug {
            println!(
                "Gen {:4} | Best: {:.0} kWh | Eff: {:.2}% | Runs: {}",
                r.generation, r.energy.max, r.efficiency.max, r.sizes.unique_runs
            );
        }
    })?;
    info!("Search took {:.2}s", start.elapsed().as_secs_f32());

    reports::print_history(&history);
    if let Some(best) = history.best_by_energy() {
        reports::print_best_layout("BEST BY ENERGY", best);
    }
    if let Some(best) = history.best_by_efficiency() {
        reports::print_best_layout("BEST BY EFFICIENCY", best);
    }

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&history)?)?;
        info!("💾 History written to {}", path);
    }
    Ok(())
}
