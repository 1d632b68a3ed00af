//! Agent groups and the per-tick step scaffold.

use crate::agent::{Agent, AgentId, Bounds};
use crate::behavior::{
    Behavior, CaptureRequest, PredatorBehavior, PreyBehavior, Role, SiblingView, StepContext,
};
use crate::config::{GroupConfig, PredatorParams, PreyParams};
use crate::error::{Error, Result};
use crate::rules;
use crate::vector::Vector2D;
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};

/// Shared handle to a group, used by events, the driver and sibling links.
pub type GroupHandle = Rc<RefCell<AgentGroup>>;

/// Weighted flocking plus role plan for one agent.
struct AgentPlan {
    flocking: [Vector2D; 3],
    role: crate::behavior::RolePlan,
}

/// A population of agents sharing one configuration and one role.
#[derive(Debug)]
pub struct AgentGroup {
    name: String,
    config: GroupConfig,
    bounds: Bounds,
    agents: Vec<Agent>,
    initial_count: usize,
    behavior: Box<dyn Behavior>,
    siblings: Vec<Weak<RefCell<AgentGroup>>>,
    rng: ChaCha8Rng,
    next_id: u64,
}

impl AgentGroup {
    pub fn new(
        name: impl Into<String>,
        count: usize,
        bounds: Bounds,
        config: GroupConfig,
        behavior: Box<dyn Behavior>,
        seed: u64,
    ) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidCount(count));
        }
        config.validate()?;

        let mut group = Self {
            name: name.into(),
            config,
            bounds,
            agents: Vec::with_capacity(count),
            initial_count: count,
            behavior,
            siblings: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 0,
        };
        group.populate(count);

        debug!(
            "Created {} group '{}' with {} agents in {}x{}",
            group.role(),
            group.name,
            count,
            bounds.width(),
            bounds.height()
        );
        Ok(group)
    }

    pub fn prey(
        name: impl Into<String>,
        count: usize,
        bounds: Bounds,
        config: GroupConfig,
        params: PreyParams,
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        Self::new(name, count, bounds, config, Box::new(PreyBehavior::new(params)), seed)
    }

    pub fn predator(
        name: impl Into<String>,
        count: usize,
        bounds: Bounds,
        config: GroupConfig,
        params: PredatorParams,
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        Self::new(
            name,
            count,
            bounds,
            config,
            Box::new(PredatorBehavior::new(params)),
            seed,
        )
    }

    pub fn into_handle(self) -> GroupHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Tracks a resized viewport. Takes effect from the next step.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn role(&self) -> Role {
        self.behavior.role()
    }

    pub fn is_prey(&self) -> bool {
        self.role().is_prey()
    }

    pub fn is_predator(&self) -> bool {
        self.role().is_predator()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Population size the group was created with.
    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn sibling_count(&self) -> usize {
        self.siblings.iter().filter(|s| s.strong_count() > 0).count()
    }

    /// Replaces the sibling set. Every group should receive all others but itself.
    pub fn set_siblings(&mut self, siblings: Vec<Weak<RefCell<AgentGroup>>>) {
        self.siblings = siblings;
    }

    /// Throws away the population and spawns `count` fresh random agents.
    pub fn reinit(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidCount(count));
        }
        self.agents.clear();
        self.populate(count);
        debug!("Reinitialised group '{}' with {} agents", self.name, count);
        Ok(())
    }

    /// Adds an agent at `position` with this group's speed and force limits.
    pub fn spawn_at(&mut self, position: Vector2D) -> AgentId {
        let id = self.allocate_id();
        let agent = Agent::spawn(
            id,
            self.bounds.clamp(position),
            self.config.max_speed,
            self.config.max_force,
            &mut self.rng,
        );
        self.agents.push(agent);
        id
    }

    /// Adds a fully built agent, keeping its limits. Its id is reassigned.
    pub fn insert(&mut self, agent: Agent) -> AgentId {
        let id = self.allocate_id();
        let agent = Agent::new(
            id,
            agent.position,
            agent.velocity,
            agent.max_speed(),
            agent.max_force(),
        );
        self.agents.push(agent);
        id
    }

    /// Removes captured agents. Unknown ids are ignored. Returns how many went.
    pub fn apply_captures(&mut self, ids: &[AgentId]) -> usize {
        let before = self.agents.len();
        self.agents.retain(|agent| !ids.contains(&agent.id()));
        let removed = before - self.agents.len();
        if removed > 0 {
            debug!("Group '{}' lost {} agents to capture", self.name, removed);
        }
        removed
    }

    /// Advances every live agent by one tick.
    ///
    /// Upkeep runs first. Steering is then planned against a frozen view of
    /// this group and its siblings, and only afterwards are forces applied,
    /// agents moved, offspring added, captures handed to their owners and the
    /// dead removed.
    pub fn step(&mut self) {
        for agent in self.agents.iter_mut().filter(|a| a.is_alive()) {
            self.behavior.metabolize(agent);
        }

        let siblings: Vec<GroupHandle> = self.siblings.iter().filter_map(Weak::upgrade).collect();
        let plans = self.plan_tick(&siblings);

        let bounds = self.bounds;
        let mut births = Vec::new();
        let mut captures: BTreeMap<usize, Vec<AgentId>> = BTreeMap::new();

        for (agent, plan) in self.agents.iter_mut().zip(plans) {
            let Some(plan) = plan else { continue };

            for force in plan.flocking.into_iter().chain(plan.role.forces) {
                agent.apply_force(force);
            }
            if plan.role.fear_gain > 0.0 {
                agent.raise_fear(plan.role.fear_gain);
            }
            if plan.role.energy_gain > 0.0 {
                agent.gain_energy(plan.role.energy_gain);
            }
            if plan.role.energy_cost > 0.0 {
                agent.fatigue(plan.role.energy_cost);
            }
            agent.update(bounds);

            if let Some(position) = plan.role.offspring {
                births.push((position, agent.max_speed(), agent.max_force()));
            }
            if let Some(CaptureRequest { sibling, agent: prey }) = plan.role.capture {
                captures.entry(sibling).or_default().push(prey);
            }
        }

        for (position, max_speed, max_force) in births {
            let id = self.allocate_id();
            let position = bounds.clamp(position);
            let child = Agent::spawn(id, position, max_speed, max_force, &mut self.rng);
            self.agents.push(child);
        }

        for (index, ids) in captures {
            if let Some(owner) = siblings.get(index) {
                match owner.try_borrow_mut() {
                    Ok(mut owner) => {
                        owner.apply_captures(&ids);
                    }
                    Err(_) => warn!(
                        "Group '{}' could not hand {} captures to a busy sibling",
                        self.name,
                        ids.len()
                    ),
                }
            }
        }

        self.agents.retain(Agent::is_alive);
    }

    /// Read phase: plans every live agent without mutating anything shared.
    fn plan_tick(&mut self, siblings: &[GroupHandle]) -> Vec<Option<AgentPlan>> {
        let borrowed: Vec<(usize, Ref<'_, AgentGroup>)> = siblings
            .iter()
            .enumerate()
            .filter_map(|(index, handle)| match handle.try_borrow() {
                Ok(group) => Some((index, group)),
                Err(_) => {
                    warn!("Group '{}' skipped a sibling that is being stepped", self.name);
                    None
                }
            })
            .collect();
        let views: Vec<SiblingView<'_>> = borrowed
            .iter()
            .map(|(index, group)| SiblingView {
                index: *index,
                role: group.role(),
                agents: group.agents(),
            })
            .collect();

        let config = &self.config;
        let flock = &self.agents;
        let mut claims = HashSet::new();
        let mut ctx = StepContext::new(config, flock, &views, &mut self.rng, &mut claims);

        let mut plans = Vec::with_capacity(flock.len());
        for agent in flock {
            if !agent.is_alive() {
                plans.push(None);
                continue;
            }
            let live = || flock.iter().filter(|a| a.is_alive());
            let flocking = [
                rules::cohesion(agent, live(), config.vision_radius, config.field_of_view)
                    * config.cohesion_weight,
                rules::alignment(agent, live(), config.vision_radius, config.field_of_view)
                    * config.alignment_weight,
                rules::separation(agent, live(), config.separation_distance, config.field_of_view)
                    * config.separation_weight,
            ];
            let role = self.behavior.plan(agent, &mut ctx);
            plans.push(Some(AgentPlan { flocking, role }));
        }
        plans
    }

    fn populate(&mut self, count: usize) {
        for _ in 0..count {
            let position = self.bounds.random_point(&mut self.rng);
            self.spawn_at(position);
        }
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Gives every group all the others as siblings.
pub fn link_groups(groups: &[GroupHandle]) {
    for group in groups {
        let others = groups
            .iter()
            .filter(|other| !Rc::ptr_eq(other, group))
            .map(Rc::downgrade)
            .collect();
        group.borrow_mut().set_siblings(others);
    }
    debug!("Linked {} groups", groups.len());
}
