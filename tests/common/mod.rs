#![allow(dead_code)]

use std::sync::Arc;
use windforge::config::{Config, Objective, TurbineParams};
use windforge::fitness::FitnessEvaluator;
use windforge::site::{Grid, GridCell, TerrainContext, WindCase, WindScenario};
use windforge::wake::WakeModel;

/// `cols × rows` cells, `spacing` metres apart, ids row-major from 0.
pub fn lattice(cols: usize, rows: usize, spacing: f64) -> Grid {
    let cells = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .enumerate()
        .map(|(i, (r, c))| GridCell::new(i as u32, c as f64 * spacing, r as f64 * spacing))
        .collect();
    Grid::new(cells).unwrap()
}

/// Cells strung out along the y axis (north-south).
pub fn column(count: usize, spacing: f64) -> Grid {
    lattice(1, count, spacing)
}

pub fn north_wind(speed: f64) -> WindScenario {
    WindScenario::single(0.0, speed).unwrap()
}

pub fn scenario(cases: &[(f64, f64, f64)]) -> WindScenario {
    WindScenario::new(
        cases
            .iter()
            .map(|&(d, s, p)| WindCase::new(d, s, p))
            .collect(),
    )
    .unwrap()
}

/// Turbine without the height profile, so scenario speeds reach the hub unchanged.
pub fn flat_turbine() -> TurbineParams {
    TurbineParams {
        log_profile: false,
        ..TurbineParams::default()
    }
}

pub fn flat_model() -> WakeModel {
    WakeModel::new(&flat_turbine()).unwrap()
}

pub fn evaluator(grid: Grid, scenario: WindScenario) -> FitnessEvaluator {
    evaluator_with(grid, scenario, TerrainContext::default())
}

pub fn evaluator_with(grid: Grid, scenario: WindScenario, terrain: TerrainContext) -> FitnessEvaluator {
    FitnessEvaluator::new(
        Arc::new(grid),
        Arc::new(scenario),
        Arc::new(terrain),
        flat_model(),
        Objective::Energy,
    )
    .unwrap()
}

/// A small, fast search configuration that always runs every iteration.
pub fn small_config(turbines: usize, iterations: usize) -> Config {
    let mut config = Config::default();
    config.search.turbines = turbines;
    config.search.max_iterations = iterations;
    config.search.initial_population = 16;
    config.search.max_population = 32;
    config.search.stop_on_full_efficiency = false;
    config.turbine = flat_turbine();
    config
}
