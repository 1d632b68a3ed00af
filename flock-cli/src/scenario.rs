//! Turns a [`ScenarioSettings`] file into a ready-to-run [`Simulation`].

use anyhow::{Context, Result};
use flock_core::{
    AgentGroup, Bounds, GroupConfig, PredatorParams, Presenter, PreyParams, Simulation,
};
use flock_shared::{
    GroupSettings, PredatorOverrides, PreyOverrides, RoleKind, ScenarioSettings,
    SteeringSettings,
};
use std::rc::Rc;

pub fn steering_config(settings: &SteeringSettings) -> GroupConfig {
    GroupConfig {
        vision_radius: settings.vision_radius,
        separation_distance: settings.separation_distance,
        max_speed: settings.max_speed,
        max_force: settings.max_force,
        field_of_view: settings.field_of_view,
        cohesion_weight: settings.cohesion_weight,
        alignment_weight: settings.alignment_weight,
        separation_weight: settings.separation_weight,
    }
}

pub fn prey_params(overrides: &PreyOverrides) -> PreyParams {
    let defaults = PreyParams::default();
    PreyParams {
        fatigue_rate: overrides.fatigue_rate.unwrap_or(defaults.fatigue_rate),
        reproduction_energy: overrides
            .reproduction_energy
            .unwrap_or(defaults.reproduction_energy),
        reproduction_min_age: overrides
            .reproduction_min_age
            .unwrap_or(defaults.reproduction_min_age),
        reproduction_probability: overrides
            .reproduction_probability
            .unwrap_or(defaults.reproduction_probability),
        reproduction_cost: overrides
            .reproduction_cost
            .unwrap_or(defaults.reproduction_cost),
        offspring_spread: overrides.offspring_spread.unwrap_or(defaults.offspring_spread),
        detection_range_factor: overrides
            .detection_range_factor
            .unwrap_or(defaults.detection_range_factor),
        flee_weight: overrides.flee_weight.unwrap_or(defaults.flee_weight),
        fear_increment: overrides.fear_increment.unwrap_or(defaults.fear_increment),
        wander_strength: overrides.wander_strength.unwrap_or(defaults.wander_strength),
    }
}

pub fn predator_params(overrides: &PredatorOverrides) -> PredatorParams {
    let defaults = PredatorParams::default();
    PredatorParams {
        fatigue_rate: overrides.fatigue_rate.unwrap_or(defaults.fatigue_rate),
        chase_range_factor: overrides
            .chase_range_factor
            .unwrap_or(defaults.chase_range_factor),
        chase_weight: overrides.chase_weight.unwrap_or(defaults.chase_weight),
        capture_radius: overrides.capture_radius.unwrap_or(defaults.capture_radius),
        capture_reward: overrides.capture_reward.unwrap_or(defaults.capture_reward),
    }
}

fn build_group(settings: &GroupSettings, bounds: Bounds, seed: u64) -> Result<AgentGroup> {
    let config = steering_config(&settings.steering);
    let group = match settings.role {
        RoleKind::Prey => AgentGroup::prey(
            settings.name.clone(),
            settings.count,
            bounds,
            config,
            prey_params(&settings.prey.unwrap_or_default()),
            seed,
        ),
        RoleKind::Predator => AgentGroup::predator(
            settings.name.clone(),
            settings.count,
            bounds,
            config,
            predator_params(&settings.predator.unwrap_or_default()),
            seed,
        ),
    }?;
    Ok(group)
}

/// Builds every group of `scenario`, schedules them and links them together.
///
/// Group `i` draws its randomness from `scenario.seed + i`.
pub fn build_simulation(
    scenario: &ScenarioSettings,
    presenter: Rc<dyn Presenter>,
) -> Result<Simulation> {
    let bounds = Bounds::new(scenario.width, scenario.height).context("Invalid world size")?;
    let mut sim = Simulation::new(presenter);

    for (index, settings) in scenario.groups.iter().enumerate() {
        let seed = scenario.seed.wrapping_add(index as u64);
        let group = build_group(settings, bounds, seed)
            .with_context(|| format!("Invalid group '{}'", settings.name))?;
        sim.add_group(group, settings.delay)
            .with_context(|| format!("Cannot schedule group '{}'", settings.name))?;
        log::debug!(
            "Group '{}': {} {:?} agents every {} ticks",
            settings.name,
            settings.count,
            settings.role,
            settings.delay
        );
    }
    sim.link_groups();

    Ok(sim)
}
