//! The driver: owns the groups and the scheduler and answers the
//! presentation layer's `next`, `restart` and `draw`.

use crate::behavior::Role;
use crate::error::{Error, Result};
use crate::group::{link_groups, AgentGroup, GroupHandle};
use crate::presenter::{GroupFrame, Presenter};
use crate::scheduler::{AgentGroupUpdateEvent, EventScheduler};
use log::{debug, info};
use std::cell::Ref;
use std::rc::Rc;

#[derive(Debug)]
struct Registered {
    group: GroupHandle,
    delay: u64,
}

/// Population snapshot of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatus {
    pub name: String,
    pub role: Role,
    pub population: usize,
    pub mean_energy: f64,
}

pub struct Simulation {
    scheduler: EventScheduler,
    groups: Vec<Registered>,
    presenter: Rc<dyn Presenter>,
}

impl Simulation {
    pub fn new(presenter: Rc<dyn Presenter>) -> Self {
        Self {
            scheduler: EventScheduler::new(),
            groups: Vec::new(),
            presenter,
        }
    }

    /// Registers `group`, stepped every `delay` ticks starting now.
    ///
    /// Call [`Simulation::link_groups`] once every group is added.
    pub fn add_group(&mut self, group: AgentGroup, delay: u64) -> Result<GroupHandle> {
        if delay == 0 {
            return Err(Error::InvalidDelay);
        }
        let handle = group.into_handle();
        schedule_updates(&mut self.scheduler, &self.presenter, &handle, delay)?;
        debug!(
            "Registered group '{}' with update delay {}",
            handle.borrow().name(),
            delay
        );
        self.groups.push(Registered {
            group: Rc::clone(&handle),
            delay,
        });
        Ok(handle)
    }

    /// Links every registered group to all the others.
    pub fn link_groups(&self) {
        let handles: Vec<GroupHandle> = self.groups.iter().map(|r| Rc::clone(&r.group)).collect();
        link_groups(&handles);
    }

    /// Runs the next scheduled event. Returns false when nothing is pending.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.scheduler.next()
    }

    /// Runs up to `events` scheduled events and returns how many ran.
    pub fn run(&mut self, events: u64) -> u64 {
        let mut ran = 0;
        while ran < events && self.scheduler.next() {
            ran += 1;
        }
        ran
    }

    /// Respawns every group at its initial size and restarts the clock.
    ///
    /// Each group keeps the update delay it was registered with.
    pub fn restart(&mut self) -> Result<()> {
        self.scheduler.restart();
        for registered in &self.groups {
            {
                let mut group = registered.group.borrow_mut();
                let count = group.initial_count();
                group.reinit(count)?;
            }
            schedule_updates(
                &mut self.scheduler,
                &self.presenter,
                &registered.group,
                registered.delay,
            )?;
        }
        info!("Simulation restarted with {} groups", self.groups.len());
        self.draw();
        Ok(())
    }

    /// Hands the current state of every group to the presenter.
    pub fn draw(&self) {
        let borrowed: Vec<Ref<'_, AgentGroup>> = self.groups.iter().map(|r| r.group.borrow()).collect();
        let frames: Vec<GroupFrame<'_>> = borrowed
            .iter()
            .map(|group| GroupFrame {
                name: group.name(),
                role: group.role(),
                agents: group.agents(),
            })
            .collect();
        self.presenter.render(self.scheduler.current_date(), &frames);
    }

    pub fn report(&self) -> Vec<GroupStatus> {
        self.groups
            .iter()
            .map(|registered| {
                let group = registered.group.borrow();
                let population = group.len();
                let mean_energy = if population == 0 {
                    0.0
                } else {
                    group.agents().iter().map(|a| a.energy()).sum::<f64>() / population as f64
                };
                GroupStatus {
                    name: group.name().to_string(),
                    role: group.role(),
                    population,
                    mean_energy,
                }
            })
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupHandle> {
        self.groups.iter().map(|r| &r.group)
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn current_date(&self) -> u64 {
        self.scheduler.current_date()
    }
}

/// Seeds the self-rescheduling update chain of one group at the current date.
fn schedule_updates(
    scheduler: &mut EventScheduler,
    presenter: &Rc<dyn Presenter>,
    group: &GroupHandle,
    delay: u64,
) -> Result<()> {
    let event = AgentGroupUpdateEvent::new(Rc::clone(group), Rc::clone(presenter), delay)?;
    let now = scheduler.current_date();
    scheduler.add_event(now, Box::new(event))
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("scheduler", &self.scheduler)
            .field("groups", &self.groups.len())
            .finish()
    }
}
