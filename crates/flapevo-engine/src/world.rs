use std::collections::VecDeque;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{Observation, episode::EpisodeSeed};

/// Height of the playable area in pixels; the ground is at the bottom edge.
pub const WORLD_HEIGHT: f32 = 512.0;

/// Fixed horizontal position of the bird's left edge.
pub const BIRD_X: f32 = 56.0;
pub const BIRD_WIDTH: f32 = 34.0;
pub const BIRD_HEIGHT: f32 = 24.0;
/// Offset from the bird's top edge used as its center when measuring gap distance.
pub const BIRD_CENTER_OFFSET: f32 = 16.0;
pub const BIRD_START_Y: f32 = 244.0;

/// Downward acceleration per frame.
pub const GRAVITY: f32 = 1.0;
/// Velocity set by a flap (negative is upwards).
pub const FLAP_VELOCITY: f32 = -9.0;
pub const MAX_FALL_SPEED: f32 = 10.0;

pub const PIPE_WIDTH: f32 = 52.0;
pub const PIPE_GAP: f32 = 140.0;
pub const PIPE_SPEED: f32 = 4.0;
/// Horizontal distance between consecutive pipes.
pub const PIPE_SPACING: f32 = 200.0;
/// Smallest height of either pipe segment.
pub const PIPE_MIN_SEGMENT: f32 = 50.0;
/// Distance from the bird at which new pipes appear.
pub const PIPE_SPAWN_DISTANCE: f32 = 568.0;

/// The controllable bird.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    y: f32,
    velocity: f32,
}

impl Bird {
    #[must_use]
    pub const fn new(y: f32) -> Self {
        Self { y, velocity: 0.0 }
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        BIRD_X
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    fn advance(&mut self, flap: bool) {
        self.velocity = if flap {
            FLAP_VELOCITY
        } else {
            f32::min(self.velocity + GRAVITY, MAX_FALL_SPEED)
        };
        self.y += self.velocity;
    }

    fn hits_bounds(&self) -> bool {
        self.y < 0.0 || self.y + BIRD_HEIGHT >= WORLD_HEIGHT
    }
}

/// A pipe pair: a top segment of `top_height` pixels, then the gap, then the
/// bottom segment down to the ground.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    x: f32,
    top_height: f32,
    passed: bool,
}

impl Pipe {
    #[must_use]
    pub const fn new(x: f32, top_height: f32) -> Self {
        Self {
            x,
            top_height,
            passed: false,
        }
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub const fn top_height(&self) -> f32 {
        self.top_height
    }

    #[must_use]
    pub const fn bottom_height(&self) -> f32 {
        WORLD_HEIGHT - self.top_height - PIPE_GAP
    }

    /// Vertical center of the gap.
    #[must_use]
    pub fn gap_center(&self) -> f32 {
        self.top_height + (WORLD_HEIGHT - self.top_height - self.bottom_height()) / 2.0
    }

    fn is_behind(&self, bird: &Bird) -> bool {
        self.x + PIPE_WIDTH < bird.x()
    }

    fn collides(&self, bird: &Bird) -> bool {
        let overlaps_x = bird.x() + BIRD_WIDTH > self.x && bird.x() < self.x + PIPE_WIDTH;
        let gap_bottom = self.top_height + PIPE_GAP;
        let outside_gap = bird.y() < self.top_height || bird.y() + BIRD_HEIGHT > gap_bottom;
        overlaps_x && outside_gap
    }
}

/// Result of advancing the world by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum FrameOutcome {
    /// The bird is still flying; carries the number of pipes passed this frame.
    Flying { pipes_passed: usize },
    Crashed,
}

/// Bird, pipes and the random stream generating pipe heights.
#[derive(Debug, Clone)]
pub struct World {
    rng: Pcg32,
    bird: Bird,
    pipes: VecDeque<Pipe>,
}

impl World {
    /// Creates a world with the bird at its start position and the first pipe
    /// [`PIPE_SPAWN_DISTANCE`] ahead of it.
    #[must_use]
    pub fn with_seed(seed: EpisodeSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::seed_from_u64(seed.value()),
            bird: Bird::new(BIRD_START_Y),
            pipes: VecDeque::new(),
        };
        this.spawn_pipe();
        this
    }

    #[must_use]
    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> + '_ {
        self.pipes.iter()
    }

    /// Returns the nearest pipe the bird has not fully passed yet.
    #[must_use]
    pub fn next_pipe(&self) -> &Pipe {
        self.pipes
            .iter()
            .find(|p| !p.is_behind(&self.bird))
            .expect("a pipe is always spawned ahead of the bird")
    }

    #[must_use]
    pub fn observe(&self) -> Observation {
        Observation::of(&self.bird, self.next_pipe())
    }

    /// Applies the flap decision, scrolls the pipes and checks collisions.
    pub fn advance(&mut self, flap: bool) -> FrameOutcome {
        self.bird.advance(flap);

        let mut pipes_passed = 0;
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
            if !pipe.passed && pipe.is_behind(&self.bird) {
                pipe.passed = true;
                pipes_passed += 1;
            }
        }
        while self.pipes.front().is_some_and(|p| p.x + PIPE_WIDTH < 0.0) {
            self.pipes.pop_front();
        }
        let spawn_after = self.bird.x() + PIPE_SPAWN_DISTANCE - PIPE_SPACING;
        if self.pipes.back().is_none_or(|p| p.x <= spawn_after) {
            self.spawn_pipe();
        }

        if self.bird.hits_bounds() || self.pipes.iter().any(|p| p.collides(&self.bird)) {
            return FrameOutcome::Crashed;
        }
        FrameOutcome::Flying { pipes_passed }
    }

    fn spawn_pipe(&mut self) {
        let max_top = WORLD_HEIGHT - PIPE_MIN_SEGMENT - PIPE_GAP;
        let top_height = self.rng.random_range(PIPE_MIN_SEGMENT..=max_top);
        let x = self.bird.x() + PIPE_SPAWN_DISTANCE;
        self.pipes.push_back(Pipe::new(x, top_height));
    }
}
