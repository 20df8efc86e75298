//! Ranking, elitism and tournament selection.
//!
//! The routines are generic over the item type and take the fitness key as a
//! function, so the ordering lives at the call site rather than in the type.

use flapevo_controller::Controller;
use rand::{Rng, seq::index};

/// Stable sort by descending `key`.
///
/// Items with equal keys keep their relative order. NaN keys sort first
/// ([`f32::total_cmp`] order).
pub fn rank_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f32,
{
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// Ranks controllers by descending fitness.
pub fn rank(population: &mut [Controller]) {
    rank_by(population, Controller::fitness);
}

#[must_use]
pub fn is_ranked(population: &[Controller]) -> bool {
    population.is_sorted_by(|a, b| a.fitness() >= b.fitness())
}

/// Unmutated copies of the first `count` controllers of a ranked population,
/// with fitness and trial state reset.
///
/// # Panics
///
/// Panics if `count` exceeds the population size.
#[must_use]
pub fn elites(ranked: &[Controller], count: usize) -> Vec<Controller> {
    ranked[..count].iter().map(Controller::elite_copy).collect()
}

/// Number of top-ranked controllers allowed to become parents:
/// `round(population_size × survival_rate)`, clamped to `[1, population_size]`.
///
/// Halves round to the nearest even count.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn survivor_count(population_size: usize, survival_rate: f32) -> usize {
    let exact = population_size as f32 * survival_rate;
    let count = exact.round_ties_even().max(0.0) as usize;
    count.clamp(1, population_size.max(1))
}

/// Tournament selection: samples `min(size, eligible)` distinct members of the
/// pool uniformly at random and returns the index of the fittest one.
///
/// `exclude` removes one pool index from the draw.
///
/// # Panics
///
/// Panics if `size` is zero or no member is eligible.
pub fn tournament<T, F, R>(
    pool: &[T],
    key: F,
    size: usize,
    exclude: Option<usize>,
    rng: &mut R,
) -> usize
where
    F: Fn(&T) -> f32,
    R: Rng + ?Sized,
{
    assert!(size > 0, "tournament size must be positive");
    let excluded = usize::from(exclude.is_some_and(|i| i < pool.len()));
    let eligible = pool.len() - excluded;
    assert!(eligible > 0, "no eligible tournament entrant");

    index::sample(rng, eligible, size.min(eligible))
        .into_iter()
        .map(|i| match exclude {
            Some(e) if i >= e => i + 1,
            _ => i,
        })
        .max_by(|&a, &b| key(&pool[a]).total_cmp(&key(&pool[b])))
        .expect("at least one entrant is sampled")
}

/// Selects two parents by independent tournaments.
///
/// When the pool has more than one member the second parent is drawn from the
/// pool without the first, so a pair never degenerates into self-crossover.
pub fn select_parents<T, F, R>(pool: &[T], key: F, size: usize, rng: &mut R) -> (usize, usize)
where
    F: Fn(&T) -> f32,
    R: Rng + ?Sized,
{
    let first = tournament(pool, &key, size, None, rng);
    let second = if pool.len() > 1 {
        tournament(pool, &key, size, Some(first), rng)
    } else {
        first
    };
    (first, second)
}
