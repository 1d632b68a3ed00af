//! Predator/prey flocking on a discrete-event clock.
//!
//! Groups of agents steer by cohesion, alignment and separation, plus
//! whatever their role adds: prey flee, wander and breed, predators hunt.
//! Each group is advanced by a self-rescheduling event, so groups can run at
//! different cadences on one shared clock.

pub mod agent;
pub mod behavior;
pub mod config;
pub mod error;
pub mod group;
pub mod presenter;
pub mod rules;
pub mod scheduler;
pub mod simulation;
pub mod vector;

pub use agent::{Agent, AgentId, Bounds, MAX_ENERGY};
pub use behavior::{Behavior, PredatorBehavior, PreyBehavior, Role, RolePlan, StepContext};
pub use config::{GroupConfig, PredatorParams, PreyParams};
pub use error::{Error, Result};
pub use group::{link_groups, AgentGroup, GroupHandle};
pub use presenter::{GroupFrame, HeadlessPresenter, Presenter};
pub use scheduler::{AgentGroupUpdateEvent, Event, EventScheduler, FnEvent};
pub use simulation::{GroupStatus, Simulation};
pub use vector::Vector2D;
