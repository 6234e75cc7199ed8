use crate::config::CrossoverMethod;
use crate::core_types::Genome;
use fastrand::Rng;
use itertools::Itertools;
use tracing::warn;

/// Split indices in `1..len`, sorted and distinct. At most `len - 1` points.
pub fn split_points(len: usize, points: usize, method: CrossoverMethod, rng: &mut Rng) -> Vec<usize> {
    if len < 2 || points == 0 {
        return Vec::new();
    }
    let points = points.min(len - 1);

    match method {
        CrossoverMethod::Equ => {
            let step = len as f64 / (points + 1) as f64;
            (1..=points)
                .map(|j| ((j as f64 * step).round() as usize).clamp(1, len - 1))
                .dedup()
                .collect()
        }
        CrossoverMethod::Ran => {
            let mut candidates: Vec<usize> = (1..len).collect();
            rng.shuffle(&mut candidates);
            candidates.truncate(points);
            candidates.sort_unstable();
            candidates
        }
    }
}

/// Two complementary children taking alternating segments of `a` and `b`.
pub fn recombine_pair(a: &Genome, b: &Genome, splits: &[usize]) -> (Genome, Genome) {
    let mut c1 = a.clone();
    let mut c2 = b.clone();

    let mut bounds = splits.to_vec();
    bounds.push(a.len());

    let mut start = 0;
    for (segment, &end) in bounds.iter().enumerate() {
        if segment % 2 == 1 {
            c1.bits_mut()[start..end].copy_from_slice(&b.bits()[start..end]);
            c2.bits_mut()[start..end].copy_from_slice(&a.bits()[start..end]);
        }
        start = end;
    }
    (c1, c2)
}

/// Recombines every unordered survivor pair, bounded by `max_population` children.
///
/// With fewer than two survivors there is nothing to pair and the survivors
/// are passed through unchanged.
pub fn recombine(
    survivors: &[Genome],
    cross_points: usize,
    method: CrossoverMethod,
    max_population: usize,
    rng: &mut Rng,
) -> Vec<Genome> {
    let cap = max_population.max(1);
    if survivors.len() < 2 {
        return survivors.iter().take(cap).cloned().collect();
    }

    let mut pairs: Vec<(usize, usize)> = (0..survivors.len()).tuple_combinations().collect();
    if pairs.len() * 2 > cap {
        warn!(
            "{} pairings exceed population cap {}; sampling",
            pairs.len(),
            cap
        );
        rng.shuffle(&mut pairs);
        pairs.truncate(cap.div_ceil(2));
    }

    let len = survivors[0].len();
    let mut children = Vec::with_capacity(pairs.len() * 2);
    for (i, j) in pairs {
        let splits = split_points(len, cross_points, method, rng);
        let (c1, c2) = recombine_pair(&survivors[i], &survivors[j], &splits);
        children.push(c1);
        children.push(c2);
    }
    children.truncate(cap);
    children
}
