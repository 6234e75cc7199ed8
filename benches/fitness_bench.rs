use criterion::{criterion_group, criterion_main, Criterion};
use fastrand::Rng;
use std::hint::black_box;
use std::sync::Arc;
use windforge::config::{Objective, TurbineParams};
use windforge::fitness::FitnessEvaluator;
use windforge::optimizer::mutation::initial_population;
use windforge::site::{Grid, GridCell, TerrainContext, WindCase, WindScenario};
use windforge::wake::WakeModel;

fn setup_evaluator() -> FitnessEvaluator {
    let mut cells = Vec::new();
    for r in 0..20 {
        for c in 0..20 {
            cells.push(GridCell::new((r * 20 + c) as u32, c as f64 * 80.0, r as f64 * 80.0));
        }
    }
    let grid = Grid::new(cells).unwrap();

    // Twelve 30° sectors
    let cases = (0..12)
        .map(|i| WindCase::new(i as f64 * 30.0, 7.0 + (i % 4) as f64, 100.0 / 12.0))
        .collect();
    let scenario = WindScenario::new(cases).unwrap();

    FitnessEvaluator::new(
        Arc::new(grid),
        Arc::new(scenario),
        Arc::new(TerrainContext::default()),
        WakeModel::new(&TurbineParams::default()).unwrap(),
        Objective::Energy,
    )
    .unwrap()
}

fn bench_fitness(c: &mut Criterion) {
    let evaluator = setup_evaluator();
    let mut rng = Rng::with_seed(42);
    let population = initial_population(&mut rng, 400, 30, 64);

    c.bench_function("evaluate_layout_30_turbines", |b| {
        b.iter(|| evaluator.evaluate_genome(black_box(&population[0]), 0))
    });

    c.bench_function("evaluate_population_64", |b| {
        b.iter(|| evaluator.evaluate_population(black_box(&population)))
    });
}

criterion_group!(benches, bench_fitness);
criterion_main!(benches);
