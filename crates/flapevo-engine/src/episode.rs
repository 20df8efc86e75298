use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};

use crate::{
    Observation,
    world::{FrameOutcome, World},
};

/// Points awarded per pipe passed.
pub const PIPE_REWARD: f32 = 10.0;
/// Points awarded per frame survived.
pub const FRAME_REWARD: f32 = 0.1;

/// Default number of frames after which an episode ends even if the bird is still flying.
pub const DEFAULT_FRAME_LIMIT: usize = 5_000;

/// Decides whether to flap, once per simulated frame.
pub trait Pilot {
    fn decide(&mut self, observation: &Observation) -> bool;
}

impl<F> Pilot for F
where
    F: FnMut(&Observation) -> bool,
{
    fn decide(&mut self, observation: &Observation) -> bool {
        self(observation)
    }
}

/// Seed for deterministic pipe generation.
///
/// Two episodes with the same seed and the same pilot decisions are identical.
///
/// ```
/// use flapevo_engine::EpisodeSeed;
/// use rand::Rng as _;
///
/// let seed: EpisodeSeed = rand::rng().random();
/// assert_eq!(EpisodeSeed::new(seed.value()), seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{_0:016x}")]
pub struct EpisodeSeed(u64);

impl EpisodeSeed {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Distribution<EpisodeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EpisodeSeed {
        EpisodeSeed(rng.random())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeState {
    Flying,
    Crashed,
    TimedOut,
}

/// Statistics of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpisodeStats {
    /// Frames survived.
    pub frames: usize,
    pub pipes_passed: usize,
}

impl EpisodeStats {
    /// Score of the episode: pipes passed dominate, survival time breaks ties.
    ///
    /// ```
    /// use flapevo_engine::EpisodeStats;
    ///
    /// let stats = EpisodeStats { frames: 100, pipes_passed: 2 };
    /// assert_eq!(stats.score(), 30.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self) -> f32 {
        self.pipes_passed as f32 * PIPE_REWARD + self.frames as f32 * FRAME_REWARD
    }
}

/// A single run of the world, from spawn until crash or frame limit.
#[derive(Debug, Clone)]
pub struct Episode {
    world: World,
    stats: EpisodeStats,
    state: EpisodeState,
    frame_limit: usize,
}

impl Episode {
    #[must_use]
    pub fn new(seed: EpisodeSeed, frame_limit: usize) -> Self {
        Self {
            world: World::with_seed(seed),
            stats: EpisodeStats::default(),
            state: EpisodeState::Flying,
            frame_limit,
        }
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Asks the pilot for one decision and advances the world.
    ///
    /// Does nothing once the episode is over.
    pub fn step<P>(&mut self, pilot: &mut P)
    where
        P: Pilot + ?Sized,
    {
        if !self.state.is_flying() {
            return;
        }
        let flap = pilot.decide(&self.world.observe());
        match self.world.advance(flap) {
            FrameOutcome::Crashed => self.state = EpisodeState::Crashed,
            FrameOutcome::Flying { pipes_passed } => {
                self.stats.frames += 1;
                self.stats.pipes_passed += pipes_passed;
                if self.stats.frames >= self.frame_limit {
                    self.state = EpisodeState::TimedOut;
                }
            }
        }
    }

    /// Steps until the episode is over and returns its statistics.
    pub fn run_to_end<P>(mut self, pilot: &mut P) -> EpisodeStats
    where
        P: Pilot + ?Sized,
    {
        while self.state.is_flying() {
            self.step(pilot);
        }
        self.stats
    }
}

/// Plays one complete episode with the given pilot.
pub fn run_episode<P>(pilot: &mut P, seed: EpisodeSeed, frame_limit: usize) -> EpisodeStats
where
    P: Pilot + ?Sized,
{
    Episode::new(seed, frame_limit).run_to_end(pilot)
}
