use crate::core_types::Genome;
use fastrand::Rng;

/// A genome of length `len` with exactly `n` randomly placed turbines.
pub fn random_genome(rng: &mut Rng, len: usize, n: usize) -> Genome {
    let mut cells: Vec<usize> = (0..len).collect();
    rng.shuffle(&mut cells);

    let mut genome = Genome::zeros(len);
    for &i in cells.iter().take(n) {
        genome.set(i, true);
    }
    genome
}

pub fn initial_population(rng: &mut Rng, len: usize, n: usize, size: usize) -> Vec<Genome> {
    (0..size.max(1))
        .map(|_| random_genome(rng, len, n))
        .collect()
}

/// Flips each bit with `probability` (clamped to [0, 1]). Returns the flip count.
pub fn mutate_genome(genome: &mut Genome, probability: f64, rng: &mut Rng) -> usize {
    let p = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    if p == 0.0 {
        return 0;
    }

    let mut flips = 0;
    for bit in genome.bits_mut() {
        if p >= 1.0 || rng.f64() < p {
            *bit ^= 1;
            flips += 1;
        }
    }
    flips
}

pub fn mutate(genomes: &mut [Genome], probability: f64, rng: &mut Rng) -> usize {
    genomes
        .iter_mut()
        .map(|g| mutate_genome(g, probability, rng))
        .sum()
}
