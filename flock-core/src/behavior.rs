//! Role strategies plugged into the shared group step.
//!
//! A group runs the same flocking scaffold whatever its role. The
//! [`Behavior`] it carries adds upkeep, extra steering, births and capture
//! requests. New roles are new `Behavior` implementations; the scaffold and
//! the existing roles stay untouched.

use crate::agent::{Agent, AgentId, MAX_ENERGY, MAX_FEAR};
use crate::config::{GroupConfig, PredatorParams, PreyParams};
use crate::rules;
use crate::vector::Vector2D;
use rand::{Rng, RngCore};
use std::collections::HashSet;
use std::fmt;

/// Role a group plays towards its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Prey,
    Predator,
}

impl Role {
    pub fn is_prey(self) -> bool {
        self == Role::Prey
    }

    pub fn is_predator(self) -> bool {
        self == Role::Predator
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Prey => f.write_str("prey"),
            Role::Predator => f.write_str("predator"),
        }
    }
}

/// Read-only view of a linked sibling group during a step.
#[derive(Debug, Clone, Copy)]
pub struct SiblingView<'a> {
    /// Position of the sibling in the stepping group's sibling list.
    pub index: usize,
    pub role: Role,
    pub agents: &'a [Agent],
}

/// Request to remove one agent from a sibling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRequest {
    pub sibling: usize,
    pub agent: AgentId,
}

/// Everything a behavior may read while planning one agent's tick.
pub struct StepContext<'a> {
    pub config: &'a GroupConfig,
    /// The stepping group's own agents, unchanged for the whole read phase.
    pub flock: &'a [Agent],
    pub siblings: &'a [SiblingView<'a>],
    pub rng: &'a mut dyn RngCore,
    claims: &'a mut HashSet<CaptureRequest>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        config: &'a GroupConfig,
        flock: &'a [Agent],
        siblings: &'a [SiblingView<'a>],
        rng: &'a mut dyn RngCore,
        claims: &'a mut HashSet<CaptureRequest>,
    ) -> Self {
        Self {
            config,
            flock,
            siblings,
            rng,
            claims,
        }
    }

    /// Live agents of every sibling playing `role`, tagged with the sibling index.
    pub fn live_siblings(&self, role: Role) -> impl Iterator<Item = (usize, &'a Agent)> + 'a {
        let siblings: &'a [SiblingView<'a>] = self.siblings;
        siblings
            .iter()
            .filter(move |view| view.role == role)
            .flat_map(|view| {
                view.agents
                    .iter()
                    .filter(|agent| agent.is_alive())
                    .map(move |agent| (view.index, agent))
            })
    }

    /// Claims a capture for this tick. Returns false if another agent got there first.
    pub fn claim(&mut self, request: CaptureRequest) -> bool {
        self.claims.insert(request)
    }
}

/// Role-specific outcome for one agent, applied after the read phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolePlan {
    /// Steering contributions, each applied separately.
    pub forces: Vec<Vector2D>,
    pub energy_gain: f64,
    pub energy_cost: f64,
    pub fear_gain: f64,
    pub offspring: Option<Vector2D>,
    pub capture: Option<CaptureRequest>,
}

/// Strategy that gives a group its role.
pub trait Behavior: fmt::Debug {
    fn role(&self) -> Role;

    /// Upkeep applied to every live agent before steering is planned.
    fn metabolize(&self, agent: &mut Agent);

    /// Plans the role-specific part of one live agent's tick.
    fn plan(&self, agent: &Agent, ctx: &mut StepContext<'_>) -> RolePlan;
}

/// Flocks, flees predators, wanders when alone and reproduces.
#[derive(Debug, Clone, Default)]
pub struct PreyBehavior {
    pub params: PreyParams,
}

impl PreyBehavior {
    pub fn new(params: PreyParams) -> Self {
        Self { params }
    }
}

impl Behavior for PreyBehavior {
    fn role(&self) -> Role {
        Role::Prey
    }

    fn metabolize(&self, agent: &mut Agent) {
        agent.fatigue(self.params.fatigue_rate);
    }

    fn plan(&self, agent: &Agent, ctx: &mut StepContext<'_>) -> RolePlan {
        let p = &self.params;
        let mut plan = RolePlan::default();

        if agent.energy() > p.reproduction_energy
            && agent.age() > p.reproduction_min_age
            && ctx.rng.gen_bool(p.reproduction_probability)
        {
            let offset = Vector2D::new(
                ctx.rng.gen_range(0.0..p.offspring_spread),
                ctx.rng.gen_range(0.0..p.offspring_spread),
            );
            plan.offspring = Some(agent.position + offset);
            plan.energy_cost += p.reproduction_cost;
        }

        let detection_range = ctx.config.vision_radius * p.detection_range_factor;
        let mut flee = Vector2D::zero();
        let mut threats = 0usize;
        for (_, predator) in ctx.live_siblings(Role::Predator) {
            if agent.position.distance(&predator.position) < detection_range {
                flee += rules::flee(agent, predator.position, agent.max_speed());
                threats += 1;
            }
        }
        if threats > 0 {
            plan.fear_gain = p.fear_increment * threats as f64;
            let fear = (agent.fear() + plan.fear_gain).min(MAX_FEAR);
            plan.forces.push(flee * (p.flee_weight * (1.0 + fear)));
        }

        let flock: &[Agent] = ctx.flock;
        let alone = rules::visible_neighbors(
            agent,
            flock.iter().filter(|other| other.is_alive()),
            ctx.config.vision_radius,
            ctx.config.field_of_view,
        )
        .next()
        .is_none();
        if alone {
            plan.forces.push(rules::wander(p.wander_strength, &mut *ctx.rng));
        }

        plan
    }
}

/// Flocks with its own kind and hunts the nearest prey of any linked prey group.
#[derive(Debug, Clone, Default)]
pub struct PredatorBehavior {
    pub params: PredatorParams,
}

impl PredatorBehavior {
    pub fn new(params: PredatorParams) -> Self {
        Self { params }
    }

    /// Chase multiplier: 1 when full, up to 2 when starving.
    pub fn hunger_factor(energy: f64) -> f64 {
        1.0 + (1.0 - energy / MAX_ENERGY)
    }
}

impl Behavior for PredatorBehavior {
    fn role(&self) -> Role {
        Role::Predator
    }

    fn metabolize(&self, agent: &mut Agent) {
        agent.fatigue(self.params.fatigue_rate);
    }

    fn plan(&self, agent: &Agent, ctx: &mut StepContext<'_>) -> RolePlan {
        let p = &self.params;
        let mut plan = RolePlan::default();

        let siblings: &[SiblingView<'_>] = ctx.siblings;
        let nearest = siblings
            .iter()
            .filter(|view| view.role == Role::Prey)
            .filter_map(|view| {
                let live = view.agents.iter().filter(|prey| prey.is_alive());
                rules::find_closest(agent.position, live)
                    .map(|(prey, distance)| (view.index, prey, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2));

        let Some((sibling, prey, distance)) = nearest else {
            return plan;
        };
        if distance >= ctx.config.vision_radius * p.chase_range_factor {
            return plan;
        }

        let pursue = rules::seek(agent, prey.position, agent.max_speed());
        plan.forces
            .push(pursue * (p.chase_weight * Self::hunger_factor(agent.energy())));

        if distance < p.capture_radius {
            let request = CaptureRequest {
                sibling,
                agent: prey.id(),
            };
            if ctx.claim(request) {
                plan.capture = Some(request);
                plan.energy_gain += p.capture_reward;
            }
        }

        plan
    }
}
