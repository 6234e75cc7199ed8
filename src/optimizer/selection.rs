use crate::core_types::Genome;
use crate::fitness::LayoutEvaluation;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Survivor {
    pub run: usize,
    pub genome: Genome,
    pub fitness: f64,
}

/// Number of survivors kept from `unique` ranked Runs.
pub fn survivor_count(unique: usize, fraction: f64, elitism: bool, elite_count: usize) -> usize {
    if unique == 0 {
        return 0;
    }
    let fraction = if fraction.is_nan() {
        1.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let mut keep = ((fraction * unique as f64).ceil() as usize).clamp(1, unique);
    if elitism {
        keep = keep.max(elite_count.min(unique));
    }
    keep
}

/// Ranks unique Runs by fitness (descending, ties by Run order) and keeps the top share.
pub fn select(
    runs: &[LayoutEvaluation],
    fraction: f64,
    elitism: bool,
    elite_count: usize,
) -> Vec<Survivor> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<&LayoutEvaluation> = runs.iter().filter(|r| seen.insert(r.run)).collect();

    ranked.sort_by(|a, b| {
        b.fitness
            .partial_cmp(&a.fitness)
            .unwrap_or(Ordering::Equal)
            .then(a.run.cmp(&b.run))
    });

    let keep = survivor_count(ranked.len(), fraction, elitism, elite_count);
    ranked
        .into_iter()
        .take(keep)
        .map(|r| Survivor {
            run: r.run,
            genome: r.genome.clone(),
            fitness: r.fitness,
        })
        .collect()
}
