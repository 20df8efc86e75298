//! Fitness evaluation over several noisy trials.

use flapevo_controller::Controller;
use flapevo_engine::EpisodeSeed;
use flapevo_stats::outliers::trimmed_mean;
use rand::Rng;
use tracing::trace;

use crate::oracle::{Oracle, OracleFault};

/// Scores farther than this many standard deviations from the center of the
/// trial scores are left out of the aggregate.
pub const OUTLIER_STD_DEVS: f32 = 2.0;

/// Outcome of a single trial episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialScore {
    pub seed: EpisodeSeed,
    pub score: f32,
}

/// Runs a controller through independent trials and aggregates their scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitnessEvaluator {
    trials: usize,
}

impl FitnessEvaluator {
    /// # Panics
    ///
    /// Panics if `trials` is zero.
    #[must_use]
    pub fn new(trials: usize) -> Self {
        assert!(trials > 0, "at least one trial is required");
        Self { trials }
    }

    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Plays `trials` episodes and returns the outlier-trimmed mean score.
    ///
    /// See [`Self::play_trials`] for how the episodes are run.
    pub fn evaluate<O, R>(
        &self,
        controller: &mut Controller,
        oracle: &O,
        rng: &mut R,
    ) -> Result<f32, OracleFault>
    where
        O: Oracle + ?Sized,
        R: Rng + ?Sized,
    {
        let trials = self.play_trials(controller, oracle, rng)?;
        let scores = trials.iter().map(|trial| trial.score).collect::<Vec<_>>();
        Ok(aggregate_scores(&scores))
    }

    /// Plays `trials` episodes and returns every score in play order.
    ///
    /// The controller's trial state is reset before every episode, and every
    /// episode gets its own seed drawn from `rng`. The first oracle fault, or
    /// a negative or non-finite score, aborts the evaluation.
    pub fn play_trials<O, R>(
        &self,
        controller: &mut Controller,
        oracle: &O,
        rng: &mut R,
    ) -> Result<Vec<TrialScore>, OracleFault>
    where
        O: Oracle + ?Sized,
        R: Rng + ?Sized,
    {
        let mut trials = Vec::with_capacity(self.trials);
        for trial in 0..self.trials {
            controller.reset_trial_state();
            let seed: EpisodeSeed = rng.random();
            let score = oracle.run_episode(controller, seed)?;
            if !score.is_finite() || score < 0.0 {
                return Err(OracleFault::invalid_score(score));
            }
            trace!(trial, %seed, score, "trial finished");
            trials.push(TrialScore { seed, score });
        }
        Ok(trials)
    }
}

/// Aggregates trial scores; see [`trimmed_mean`].
///
/// # Panics
///
/// Panics if `scores` is empty.
#[must_use]
pub fn aggregate_scores(scores: &[f32]) -> f32 {
    trimmed_mean(scores, OUTLIER_STD_DEVS).expect("at least one trial score")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use flapevo_controller::Architecture;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Replays a fixed list of scores and records the state seen at episode start.
    struct Scripted {
        scores: Mutex<Vec<f32>>,
        seen_state: Mutex<Vec<Option<f32>>>,
    }

    impl Scripted {
        fn new(scores: &[f32]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().rev().copied().collect()),
                seen_state: Mutex::new(vec![]),
            }
        }
    }

    impl Oracle for Scripted {
        fn run_episode(
            &self,
            controller: &mut Controller,
            _seed: EpisodeSeed,
        ) -> Result<f32, OracleFault> {
            self.seen_state
                .lock()
                .unwrap()
                .push(controller.last_observed_y());
            // leave state behind so the next trial must reset it
            controller.observe(&flapevo_engine::Observation::new(0.0, 100.0, 123.0));
            self.scores
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| OracleFault::new("script exhausted"))
        }
    }

    fn controller() -> Controller {
        Controller::random(Architecture::DEFAULT, &mut Pcg32::seed_from_u64(0))
    }

    #[test]
    fn test_outlier_trial_is_excluded() {
        let oracle = Scripted::new(&[10.0, 11.0, 9.0, 10.0, 200.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let fitness = FitnessEvaluator::new(5)
            .evaluate(&mut controller(), &oracle, &mut rng)
            .unwrap();
        assert!((fitness - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_trials_are_plain_mean() {
        let oracle = Scripted::new(&[0.0, 100.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let fitness = FitnessEvaluator::new(2)
            .evaluate(&mut controller(), &oracle, &mut rng)
            .unwrap();
        assert_eq!(fitness, 50.0);
    }

    #[test]
    fn test_state_is_reset_before_every_trial() {
        let oracle = Scripted::new(&[1.0, 2.0, 3.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut c = controller();
        c.observe(&flapevo_engine::Observation::new(0.0, 0.0, 42.0));
        FitnessEvaluator::new(3)
            .evaluate(&mut c, &oracle, &mut rng)
            .unwrap();
        assert_eq!(*oracle.seen_state.lock().unwrap(), vec![None, None, None]);
    }

    #[test]
    fn test_fault_aborts_evaluation() {
        let oracle = Scripted::new(&[1.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let err = FitnessEvaluator::new(3)
            .evaluate(&mut controller(), &oracle, &mut rng)
            .unwrap_err();
        assert_eq!(err.message(), "script exhausted");
    }

    #[test]
    fn test_negative_score_is_a_fault() {
        let oracle = Scripted::new(&[-1.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(
            FitnessEvaluator::new(1)
                .evaluate(&mut controller(), &oracle, &mut rng)
                .is_err()
        );
    }

    #[test]
    fn test_play_trials_reports_every_score() {
        let oracle = Scripted::new(&[3.0, 3.0, 15.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let trials = FitnessEvaluator::new(3)
            .play_trials(&mut controller(), &oracle, &mut rng)
            .unwrap();
        let scores: Vec<_> = trials.iter().map(|t| t.score).collect();
        assert_eq!(scores, vec![3.0, 3.0, 15.0]);
        assert_ne!(trials[0].seed, trials[1].seed);
    }

    #[test]
    fn test_play_trials_rejects_non_finite_score() {
        let oracle = Scripted::new(&[5.0, f32::NAN, 5.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(
            FitnessEvaluator::new(3)
                .play_trials(&mut controller(), &oracle, &mut rng)
                .is_err()
        );
    }

    #[test]
    fn test_lucky_trial_counts_with_three_trials() {
        let oracle = Scripted::new(&[3.0, 3.0, 15.0]);
        let mut rng = Pcg32::seed_from_u64(1);
        let fitness = FitnessEvaluator::new(3)
            .evaluate(&mut controller(), &oracle, &mut rng)
            .unwrap();
        assert!((fitness - 7.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "at least one trial")]
    fn test_zero_trials_panics() {
        let _ = FitnessEvaluator::new(0);
    }
}
