use crate::consts::REPAIR_WEIGHT_FLOOR;
use crate::core_types::Genome;
use crate::fitness::LayoutEvaluation;
use fastrand::Rng;

/// Per-cell contribution scores steering the repair roulette.
///
/// A cell's score is its mean realized energy over the Runs that occupied
/// it; cells nobody occupied fall back to their standalone energy.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWeights {
    scores: Vec<f64>,
    best: f64,
}

impl CellWeights {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let best = scores
            .iter()
            .copied()
            .filter(|s| s.is_finite())
            .fold(0.0, f64::max);
        Self { scores, best }
    }

    pub fn from_evaluations(runs: &[LayoutEvaluation], standalone: &[f64]) -> Self {
        let mut sum = vec![0.0; standalone.len()];
        let mut count = vec![0usize; standalone.len()];

        for r in runs {
            for c in &r.cells {
                sum[c.cell] += c.energy;
                count[c.cell] += 1;
            }
        }

        let scores = standalone
            .iter()
            .enumerate()
            .map(|(i, &alone)| {
                if count[i] > 0 {
                    sum[i] / count[i] as f64
                } else {
                    alone
                }
            })
            .collect();

        Self::from_scores(scores)
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    fn floor(&self) -> f64 {
        (self.best * REPAIR_WEIGHT_FLOOR).max(f64::MIN_POSITIVE)
    }

    /// Weak cells are likelier to lose their turbine.
    #[inline]
    pub fn removal_weight(&self, cell: usize) -> f64 {
        (self.best - self.scores[cell]).max(0.0) + self.floor()
    }

    /// Strong cells are likelier to gain one.
    #[inline]
    pub fn addition_weight(&self, cell: usize) -> f64 {
        self.scores[cell].max(0.0) + self.floor()
    }
}

/// Roulette pick of one index into `weights`; uniform when the weights are unusable.
fn pick_weighted(rng: &mut Rng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return rng.usize(0..weights.len());
    }

    let target = rng.f64() * total;
    let mut current = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        current += w;
        if current >= target {
            return i;
        }
    }
    weights.len() - 1
}

/// Draws `k` distinct candidates; roulette over `weights` (parallel to
/// `candidates`) when given, uniform otherwise.
fn draw(rng: &mut Rng, mut candidates: Vec<usize>, k: usize, weights: Option<Vec<f64>>) -> Vec<usize> {
    let k = k.min(candidates.len());
    let mut chosen = Vec::with_capacity(k);

    match weights {
        Some(mut weights) => {
            for _ in 0..k {
                let i = pick_weighted(rng, &weights);
                chosen.push(candidates.swap_remove(i));
                weights.swap_remove(i);
            }
        }
        None => {
            rng.shuffle(&mut candidates);
            chosen.extend_from_slice(&candidates[..k]);
        }
    }
    chosen
}

/// Restores exactly `n` turbines on one genome. Returns the number of changed bits.
pub fn repair_genome(
    genome: &mut Genome,
    n: usize,
    weights: Option<&CellWeights>,
    rng: &mut Rng,
) -> usize {
    let ones = genome.count_ones();

    if ones > n {
        let occupied = genome.occupied();
        let w = weights.map(|cw| occupied.iter().map(|&c| cw.removal_weight(c)).collect());
        let remove = draw(rng, occupied, ones - n, w);
        for &c in &remove {
            genome.set(c, false);
        }
        remove.len()
    } else if ones < n {
        let vacant = genome.vacant();
        let w = weights.map(|cw| vacant.iter().map(|&c| cw.addition_weight(c)).collect());
        let add = draw(rng, vacant, n - ones, w);
        for &c in &add {
            genome.set(c, true);
        }
        add.len()
    } else {
        0
    }
}

/// The trimton operator: every genome leaves with exactly `n` ones.
///
/// `trim_force` switches from uniform to contribution-weighted choice.
pub fn repair(
    genomes: &mut [Genome],
    n: usize,
    weights: &CellWeights,
    trim_force: bool,
    rng: &mut Rng,
) -> usize {
    let weights = trim_force.then_some(weights);
    genomes
        .iter_mut()
        .map(|g| repair_genome(g, n, weights, rng))
        .sum()
}
