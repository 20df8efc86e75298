//! Crossover operators over flat weight vectors.
//!
//! - [`uniform`]: each gene from either parent with equal probability
//! - [`blend`]: fitness-weighted average of the parents' genes
//! - [`single_point`]: prefix of one parent, suffix of the other
//!
//! [`crossover`] applies the configured [`CrossoverStrategy`] to two
//! controllers. Mutation is applied afterwards by the caller (see
//! [`Mutation`](flapevo_controller::Mutation)).

use flapevo_controller::{ArchitectureError, Controller, Network};
use rand::Rng;

/// How two parents' weight vectors are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum CrossoverStrategy {
    #[display("uniform")]
    Uniform,
    #[default]
    #[display("blend")]
    Blend,
    #[display("single-point")]
    SinglePoint,
}

/// Picks every gene from `p1` or `p2` by a fair coin flip.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn uniform<R>(p1: &[f32], p2: &[f32], rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    p1.iter()
        .zip(p2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect()
}

/// Per-parent weights for [`blend`]: the parents' shares of their combined
/// fitness, or `(0.5, 0.5)` when the combined fitness is not positive.
///
/// ```
/// use flapevo_training::operators::blend_weights;
///
/// assert_eq!(blend_weights(30.0, 10.0), (0.75, 0.25));
/// assert_eq!(blend_weights(0.0, 0.0), (0.5, 0.5));
/// ```
#[must_use]
pub fn blend_weights(fitness1: f32, fitness2: f32) -> (f32, f32) {
    let total = fitness1 + fitness2;
    if total > 0.0 {
        (fitness1 / total, fitness2 / total)
    } else {
        (0.5, 0.5)
    }
}

/// Fitness-weighted average of the parents, gene by gene.
///
/// # Panics
///
/// Panics if the parents have different lengths.
#[must_use]
pub fn blend(p1: &[f32], fitness1: f32, p2: &[f32], fitness2: f32) -> Vec<f32> {
    assert_eq!(p1.len(), p2.len());
    let (w1, w2) = blend_weights(fitness1, fitness2);
    p1.iter().zip(p2).map(|(a, b)| w1 * a + w2 * b).collect()
}

/// Cuts both parents at a random index in `[1, len - 1]` and joins the
/// prefix of `p1` with the suffix of `p2`.
///
/// Vectors shorter than two genes have no valid cut and are copied from `p1`.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn single_point<R>(p1: &[f32], p2: &[f32], rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    if p1.len() < 2 {
        return p1.to_vec();
    }
    let cut = rng.random_range(1..p1.len());
    p1[..cut].iter().chain(&p2[cut..]).copied().collect()
}

/// Combines two controllers' weights into an (unmutated) offspring network.
///
/// Fails if the parents do not share an architecture.
pub fn crossover<R>(
    strategy: CrossoverStrategy,
    parent1: &Controller,
    parent2: &Controller,
    rng: &mut R,
) -> Result<Network, ArchitectureError>
where
    R: Rng + ?Sized,
{
    let architecture = parent1.architecture();
    architecture.check_weight_count(parent2.weights().len())?;
    let (p1, p2) = (parent1.weights(), parent2.weights());
    let child = match strategy {
        CrossoverStrategy::Uniform => uniform(p1, p2, rng),
        CrossoverStrategy::Blend => blend(p1, parent1.fitness(), p2, parent2.fitness()),
        CrossoverStrategy::SinglePoint => single_point(p1, p2, rng),
    };
    Network::new(architecture, child)
}

#[cfg(test)]
mod tests {
    use flapevo_controller::Architecture;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn parents(rng: &mut Pcg32) -> (Controller, Controller) {
        let a = Controller::random(Architecture::DEFAULT, rng).with_fitness(30.0);
        let b = Controller::random(Architecture::DEFAULT, rng).with_fitness(10.0);
        (a, b)
    }

    #[test]
    fn test_uniform_takes_genes_from_parents_only() {
        let mut rng = Pcg32::seed_from_u64(0);
        let (a, b) = parents(&mut rng);
        for _ in 0..20 {
            let child = crossover(CrossoverStrategy::Uniform, &a, &b, &mut rng).unwrap();
            for (i, w) in child.weights().iter().enumerate() {
                assert!(*w == a.weights()[i] || *w == b.weights()[i]);
            }
        }
    }

    #[test]
    fn test_uniform_mixes_both_parents() {
        let mut rng = Pcg32::seed_from_u64(1);
        let child = uniform(&[0.0; 64], &[1.0; 64], &mut rng);
        assert!(child.contains(&0.0));
        assert!(child.contains(&1.0));
    }

    #[test]
    fn test_blend_weights_sum_to_one() {
        for (f1, f2) in [(30.0, 10.0), (1.0, 2.0), (0.3, 123.4), (7.0, 0.0)] {
            let (w1, w2) = blend_weights(f1, f2);
            assert!((w1 + w2 - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_blend_lies_between_parents() {
        let mut rng = Pcg32::seed_from_u64(2);
        let (a, b) = parents(&mut rng);
        let child = crossover(CrossoverStrategy::Blend, &a, &b, &mut rng).unwrap();
        for ((c, x), y) in child.weights().iter().zip(a.weights()).zip(b.weights()) {
            assert!(*c >= x.min(*y) - 1e-6 && *c <= x.max(*y) + 1e-6);
            assert!((c - (0.75 * x + 0.25 * y)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_blend_without_fitness_is_midpoint() {
        assert_eq!(blend(&[0.0, 2.0], 0.0, &[1.0, 4.0], 0.0), vec![0.5, 3.0]);
        assert_eq!(blend(&[0.0, 2.0], -5.0, &[1.0, 4.0], 1.0), vec![0.5, 3.0]);
    }

    #[test]
    fn test_single_point_is_prefix_and_suffix() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p1 = [1.0; 10];
        let p2 = [2.0; 10];
        for _ in 0..50 {
            let child = single_point(&p1, &p2, &mut rng);
            let cut = child.iter().position(|&w| w == 2.0).unwrap();
            assert!((1..10).contains(&cut));
            assert!(child[..cut].iter().all(|&w| w == 1.0));
            assert!(child[cut..].iter().all(|&w| w == 2.0));
        }
    }

    #[test]
    fn test_single_point_on_single_gene() {
        let mut rng = Pcg32::seed_from_u64(4);
        assert_eq!(single_point(&[1.0], &[2.0], &mut rng), vec![1.0]);
    }

    #[test]
    fn test_offspring_keep_weight_count() {
        let mut rng = Pcg32::seed_from_u64(5);
        let (a, b) = parents(&mut rng);
        for strategy in [
            CrossoverStrategy::Uniform,
            CrossoverStrategy::Blend,
            CrossoverStrategy::SinglePoint,
        ] {
            let child = crossover(strategy, &a, &b, &mut rng).unwrap();
            assert_eq!(child.weights().len(), Architecture::DEFAULT.total_weights());
        }
    }

    #[test]
    fn test_mismatched_parents_are_rejected() {
        let mut rng = Pcg32::seed_from_u64(6);
        let a = Controller::random(Architecture::DEFAULT, &mut rng);
        let b = Controller::random(Architecture::new(6, 4).unwrap(), &mut rng);
        let child = crossover(CrossoverStrategy::Uniform, &a, &b, &mut rng);
        assert!(child.is_err());
    }
}
