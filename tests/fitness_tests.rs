mod common;

use common::*;
use std::sync::Arc;
use windforge::config::{Objective, TurbineParams};
use windforge::consts::HOURS_PER_YEAR;
use windforge::core_types::Genome;
use windforge::error::WindForgeError;
use windforge::fitness::{FitnessEvaluator, FitnessStats};
use windforge::site::{Grid, GridCell, TerrainContext};
use windforge::wake::WakeModel;

#[test]
fn test_duplicates_share_a_run() {
    let eval = evaluator(lattice(3, 3, 100.0), north_wind(10.0));
    let a = Genome::from_indices(9, &[0, 4]).unwrap();
    let b = Genome::from_indices(9, &[1, 2]).unwrap();

    let pop = vec![a.clone(), b.clone(), a.clone(), a, b];
    let result = eval.evaluate_population(&pop).unwrap();

    assert_eq!(result.unique_count(), 2);
    assert_eq!(result.members, vec![0, 1, 0, 0, 1]);
    assert_eq!(result.runs[0].run, 0);
    assert_eq!(result.runs[1].run, 1);
}

#[test]
fn test_evaluation_is_deterministic() {
    let eval = evaluator(lattice(4, 4, 120.0), scenario(&[(0.0, 9.0, 40.0), (135.0, 11.0, 60.0)]));
    let g = Genome::from_indices(16, &[0, 5, 6, 15]).unwrap();

    let first = eval.evaluate_genome(&g, 0).unwrap();
    for _ in 0..5 {
        let again = eval.evaluate_genome(&g, 0).unwrap();
        assert_eq!(again.energy, first.energy);
        assert_eq!(again.efficiency, first.efficiency);
        assert_eq!(again.cells, first.cells);
    }
}

#[test]
fn test_empty_layout_is_an_evaluation_error() {
    let eval = evaluator(lattice(3, 3, 100.0), north_wind(10.0));
    let err = eval.evaluate_genome(&Genome::zeros(9), 0).unwrap_err();
    assert!(matches!(err, WindForgeError::Evaluation(_)));

    let err = eval
        .evaluate_population(&[Genome::ones(9), Genome::zeros(9)])
        .unwrap_err();
    assert!(matches!(err, WindForgeError::Evaluation(_)));
}

#[test]
fn test_genome_length_must_match_grid() {
    let eval = evaluator(lattice(3, 3, 100.0), north_wind(10.0));
    assert!(eval.evaluate_genome(&Genome::ones(4), 0).is_err());
}

#[test]
fn test_annual_energy_of_lone_turbine() {
    let eval = evaluator(lattice(3, 3, 100.0), north_wind(10.0));
    let g = Genome::from_indices(9, &[4]).unwrap();
    let r = eval.evaluate_genome(&g, 0).unwrap();

    let p = eval.model().curve.power(10.0);
    assert!((r.energy - p * HOURS_PER_YEAR).abs() < 1e-6);
    assert_eq!(r.efficiency, 100.0);
    assert_eq!(r.fitness, r.energy);
    assert_eq!(r.cells.len(), 1);
}

#[test]
fn test_directions_weighted_by_probability() {
    let eval = evaluator(column(1, 100.0), scenario(&[(0.0, 8.0, 25.0), (90.0, 12.0, 75.0)]));
    let r = eval.evaluate_genome(&Genome::ones(1), 0).unwrap();

    let c = &eval.model().curve;
    let expected = (c.power(8.0) * 0.25 + c.power(12.0) * 0.75) * HOURS_PER_YEAR;
    assert!((r.energy - expected).abs() < 1e-6);
    assert_eq!(r.directions.len(), 2);
}

#[test]
fn test_efficiency_objective() {
    let grid = Arc::new(column(3, 100.0));
    let eval = FitnessEvaluator::new(
        grid,
        Arc::new(north_wind(10.0)),
        Arc::new(TerrainContext::default()),
        flat_model(),
        Objective::Efficiency,
    )
    .unwrap();

    let r = eval.evaluate_genome(&Genome::ones(3), 0).unwrap();
    assert_eq!(r.fitness, r.efficiency);
    assert!(r.fitness < 100.0);
}

#[test]
fn test_dedicated_worker_pool_matches_global_pool() {
    let pop: Vec<Genome> = (0..12)
        .map(|i| Genome::from_indices(16, &[i, (i + 3) % 16, 15 - i]).unwrap())
        .collect();

    let global = evaluator(lattice(4, 4, 90.0), north_wind(10.0))
        .evaluate_population(&pop)
        .unwrap();
    let pooled = evaluator(lattice(4, 4, 90.0), north_wind(10.0))
        .with_workers(2)
        .unwrap()
        .evaluate_population(&pop)
        .unwrap();

    assert_eq!(global.members, pooled.members);
    for (a, b) in global.runs.iter().zip(&pooled.runs) {
        assert_eq!(a.genome, b.genome);
        assert_eq!(a.energy, b.energy);
    }
    assert_eq!(global.energy_stats(), pooled.energy_stats());
}

#[test]
fn test_standalone_energy_ignores_wakes() {
    let eval = evaluator(column(3, 50.0), north_wind(10.0));
    let alone = eval.standalone_energy();
    let expected = eval.model().curve.power(10.0) * HOURS_PER_YEAR;
    assert_eq!(alone.len(), 3);
    assert!(alone.iter().all(|e| (e - expected).abs() < 1e-6));
}

#[test]
fn test_weibull_field_must_cover_grid() {
    let terrain = TerrainContext {
        weibull_speeds: Some(vec![8.0; 2]),
        ..Default::default()
    };
    let result = FitnessEvaluator::new(
        Arc::new(column(3, 100.0)),
        Arc::new(north_wind(10.0)),
        Arc::new(terrain),
        flat_model(),
        Objective::Energy,
    );
    assert!(matches!(result, Err(WindForgeError::Validation(_))));
}

fn rough_cell_evaluator(z0: f64, use_roughness: bool) -> Result<FitnessEvaluator, WindForgeError> {
    let mut cell = GridCell::new(0, 0.0, 0.0);
    cell.roughness = Some(z0);
    let terrain = TerrainContext {
        use_roughness,
        ..Default::default()
    };
    FitnessEvaluator::new(
        Arc::new(Grid::new(vec![cell]).unwrap()),
        Arc::new(north_wind(10.0)),
        Arc::new(terrain),
        WakeModel::new(&TurbineParams::default()).unwrap(),
        Objective::Energy,
    )
}

#[test]
fn test_cell_roughness_must_stay_below_reference_height() {
    // reference height is 10 m
    assert!(matches!(rough_cell_evaluator(9.9, true), Err(WindForgeError::Validation(_))));
    assert!(matches!(rough_cell_evaluator(10.0, true), Err(WindForgeError::Validation(_))));
    assert!(rough_cell_evaluator(9.9, false).is_ok());
    assert!(rough_cell_evaluator(0.5, true).is_ok());
}

#[test]
fn test_stats_fold() {
    let s = FitnessStats::from_values([3.0, 1.0, 2.0]);
    assert_eq!(s.max, 3.0);
    assert_eq!(s.min, 1.0);
    assert_eq!(s.mean, 2.0);
    assert_eq!(FitnessStats::from_values(Vec::<f64>::new()), FitnessStats::default());
}

#[test]
fn test_best_runs_pick_earliest_on_ties() {
    let eval = evaluator(lattice(5, 1, 100.0), north_wind(10.0));
    // Every single-turbine layout is unshaded and identical in yield.
    let pop: Vec<Genome> = (0..5).map(|i| Genome::from_indices(5, &[i]).unwrap()).collect();
    let result = eval.evaluate_population(&pop).unwrap();
    assert_eq!(result.best_by_energy().run, 0);
    assert_eq!(result.best_by_efficiency().run, 0);
}
