use crate::error::{Error, Result};
use crate::vector::Vector2D;
use rand::Rng;

pub const MAX_ENERGY: f64 = 100.0;
pub const MAX_FEAR: f64 = 1.0;

/// Fear lost on every update when no threat refreshes it.
const FEAR_DECAY: f64 = 0.05;

/// Velocity multiplier applied after bouncing off an edge.
const BOUNCE_DAMPING: f64 = 0.9;

/// Rectangle `[0, width] x [0, height]` that agents are confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    width: f64,
    height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        // `!(x > 0)` also rejects NaN
        if !(width > 0.0) || !(height > 0.0) {
            return Err(Error::InvalidBounds { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn contains(&self, point: Vector2D) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    pub fn clamp(&self, point: Vector2D) -> Vector2D {
        Vector2D::new(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2D {
        Vector2D::new(rng.gen_range(0.0..self.width), rng.gen_range(0.0..self.height))
    }
}

/// Identifier of an agent, unique within the group that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// A single simulated individual.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    pub position: Vector2D,
    pub velocity: Vector2D,
    force: Vector2D,
    max_speed: f64,
    max_force: f64,
    energy: f64,
    fear: f64,
    age: u64,
    alive: bool,
}

impl Agent {
    pub fn new(
        id: AgentId,
        position: Vector2D,
        velocity: Vector2D,
        max_speed: f64,
        max_force: f64,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            force: Vector2D::zero(),
            max_speed,
            max_force,
            energy: MAX_ENERGY,
            fear: 0.0,
            age: 0,
            alive: true,
        }
    }

    /// Spawns an agent at `position` with a random velocity in `[-1, 1)` per
    /// axis, limited to `max_speed`.
    pub fn spawn<R: Rng + ?Sized>(
        id: AgentId,
        position: Vector2D,
        max_speed: f64,
        max_force: f64,
        rng: &mut R,
    ) -> Self {
        let velocity = Vector2D::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            .limit(max_speed);
        Self::new(id, position, velocity, max_speed, max_force)
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Steering accumulated since the last update.
    pub fn force(&self) -> Vector2D {
        self.force
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn fear(&self) -> f64 {
        self.fear
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Adds one steering contribution, capped at `max_force` on its own.
    ///
    /// The cap is per call: several capped contributions may still sum past
    /// `max_force`.
    pub fn apply_force(&mut self, force: Vector2D) {
        self.force += force.limit(self.max_force);
    }

    /// Integrates one tick: velocity, position, edge reflection, ageing.
    pub fn update(&mut self, bounds: Bounds) {
        self.velocity = (self.velocity + self.force).limit(self.max_speed);
        self.position += self.velocity;

        let mut bounced = false;
        if self.position.x < 0.0 {
            self.position.x = 0.0;
            self.velocity.x = self.velocity.x.abs();
            bounced = true;
        } else if self.position.x > bounds.width() {
            self.position.x = bounds.width();
            self.velocity.x = -self.velocity.x.abs();
            bounced = true;
        }

        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = self.velocity.y.abs();
            bounced = true;
        } else if self.position.y > bounds.height() {
            self.position.y = bounds.height();
            self.velocity.y = -self.velocity.y.abs();
            bounced = true;
        }

        if bounced {
            self.velocity = self.velocity * BOUNCE_DAMPING;
        }

        self.force = Vector2D::zero();
        self.fear = (self.fear - FEAR_DECAY).max(0.0);
        self.age += 1;
    }

    /// Drains energy. Reaching zero kills the agent for good.
    pub fn fatigue(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
        if self.energy <= 0.0 {
            self.alive = false;
        }
    }

    pub fn gain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount).min(MAX_ENERGY);
    }

    pub fn raise_fear(&mut self, amount: f64) {
        self.fear = (self.fear + amount).min(MAX_FEAR);
    }
}

impl core::fmt::Display for Agent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Agent#{}[pos={}, vel={}, energy={:.2}, age={}, alive={}]",
            self.id.0, self.position, self.velocity, self.energy, self.age, self.alive
        )
    }
}
