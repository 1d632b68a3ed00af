use flock_core::{
    link_groups, Agent, AgentGroup, AgentId, Bounds, GroupConfig, HeadlessPresenter,
    PredatorParams, PreyParams, Simulation, Vector2D,
};
use proptest::prelude::*;
use std::rc::Rc;

fn world() -> Bounds {
    Bounds::new(800.0, 600.0).unwrap()
}

/// Replaces a group's random population with agents at rest at `positions`.
fn place(group: &mut AgentGroup, positions: &[(f64, f64)]) -> Vec<AgentId> {
    let existing: Vec<AgentId> = group.agents().iter().map(Agent::id).collect();
    group.apply_captures(&existing);

    let config = *group.config();
    positions
        .iter()
        .map(|&(x, y)| {
            group.insert(Agent::new(
                AgentId(0),
                Vector2D::new(x, y),
                Vector2D::zero(),
                config.max_speed,
                config.max_force,
            ))
        })
        .collect()
}

fn stock_simulation(seed: u64) -> (Simulation, Rc<HeadlessPresenter>) {
    let presenter = Rc::new(HeadlessPresenter::new(world()));
    let mut sim = Simulation::new(presenter.clone());
    let prey = AgentGroup::prey(
        "prey",
        30,
        world(),
        GroupConfig::default(),
        PreyParams::default(),
        seed,
    )
    .unwrap();
    let predator_config = GroupConfig {
        vision_radius: 120.0,
        separation_distance: 40.0,
        max_speed: 3.5,
        max_force: 0.15,
        field_of_view: std::f64::consts::PI * 0.6,
        cohesion_weight: 0.8,
        alignment_weight: 0.8,
        separation_weight: 1.2,
    };
    let predators = AgentGroup::predator(
        "predators",
        5,
        world(),
        predator_config,
        PredatorParams::default(),
        seed.wrapping_add(1),
    )
    .unwrap();
    sim.add_group(prey, 1).unwrap();
    sim.add_group(predators, 3).unwrap();
    sim.link_groups();
    (sim, presenter)
}

fn run_through(sim: &mut Simulation, date: u64) {
    while sim.scheduler().peek_date().is_some_and(|next| next <= date) {
        sim.next();
    }
}

#[test]
fn test_capture_removes_exactly_one_prey_and_rewards_predator() {
    let mut prey = AgentGroup::prey(
        "prey",
        1,
        world(),
        GroupConfig::default(),
        PreyParams::default(),
        11,
    )
    .unwrap();
    let prey_ids = place(&mut prey, &[(100.0, 100.0), (400.0, 300.0), (700.0, 500.0)]);

    // Half the energy goes to upkeep so the reward is visible below the cap.
    let hungry = PredatorParams {
        fatigue_rate: 50.0,
        ..PredatorParams::default()
    };
    let mut predators =
        AgentGroup::predator("predators", 1, world(), GroupConfig::default(), hungry, 12).unwrap();
    place(&mut predators, &[(105.0, 100.0)]);

    let prey = prey.into_handle();
    let predators = predators.into_handle();
    link_groups(&[prey.clone(), predators.clone()]);

    let untouched: Vec<(AgentId, Vector2D)> = prey.borrow().agents()[1..]
        .iter()
        .map(|a| (a.id(), a.position))
        .collect();

    predators.borrow_mut().step();

    let prey = prey.borrow();
    assert_eq!(prey.len(), 2);
    assert!(prey.agents().iter().all(|a| a.id() != prey_ids[0]));
    let remaining: Vec<(AgentId, Vector2D)> =
        prey.agents().iter().map(|a| (a.id(), a.position)).collect();
    assert_eq!(remaining, untouched);

    let predators = predators.borrow();
    assert_eq!(predators.agents()[0].energy(), 90.0);
}

#[test]
fn test_two_predators_share_one_capture() {
    let mut prey = AgentGroup::prey(
        "prey",
        1,
        world(),
        GroupConfig::default(),
        PreyParams::default(),
        21,
    )
    .unwrap();
    place(&mut prey, &[(300.0, 300.0)]);

    let hungry = PredatorParams {
        fatigue_rate: 50.0,
        ..PredatorParams::default()
    };
    let mut predators =
        AgentGroup::predator("predators", 1, world(), GroupConfig::default(), hungry, 22).unwrap();
    place(&mut predators, &[(295.0, 300.0), (305.0, 300.0)]);

    let prey = prey.into_handle();
    let predators = predators.into_handle();
    link_groups(&[prey.clone(), predators.clone()]);

    predators.borrow_mut().step();

    assert!(prey.borrow().is_empty());
    let energies: Vec<f64> = predators.borrow().agents().iter().map(|a| a.energy()).collect();
    assert_eq!(energies, vec![90.0, 50.0]);
}

#[test]
fn test_groups_run_at_their_own_cadence() {
    let (mut sim, _) = stock_simulation(3);

    run_through(&mut sim, 9);

    assert_eq!(sim.current_date(), 9);
    let groups: Vec<_> = sim.groups().cloned().collect();
    assert!(groups[0].borrow().agents().iter().all(|a| a.age() == 10));
    assert!(groups[1].borrow().agents().iter().all(|a| a.age() == 4));
}

#[test]
fn test_groups_follow_the_viewport() {
    let (mut sim, presenter) = stock_simulation(4);
    let small = Bounds::new(200.0, 100.0).unwrap();
    presenter.resize(small);

    // One update of each group at date 0.
    sim.next();
    sim.next();

    for group in sim.groups() {
        let group = group.borrow();
        assert_eq!(group.bounds(), small);
        assert!(group.agents().iter().all(|a| small.contains(a.position)));
    }
}

#[test]
fn test_restart_respawns_and_keeps_delays() {
    let (mut sim, presenter) = stock_simulation(5);
    sim.run(40);
    assert!(sim.current_date() > 0);

    sim.restart().unwrap();

    assert_eq!(sim.current_date(), 0);
    assert_eq!(sim.scheduler().len(), 2);
    assert_eq!(presenter.renders(), 1);
    let sizes: Vec<usize> = sim.groups().map(|g| g.borrow().len()).collect();
    assert_eq!(sizes, vec![30, 5]);

    run_through(&mut sim, 3);
    let groups: Vec<_> = sim.groups().cloned().collect();
    assert!(groups[0].borrow().agents().iter().all(|a| a.age() == 4));
    assert!(groups[1].borrow().agents().iter().all(|a| a.age() == 2));
}

#[test]
fn test_dates_never_go_backwards() {
    let (mut sim, _) = stock_simulation(6);
    let mut last = sim.current_date();
    for _ in 0..100 {
        assert!(sim.next());
        assert!(sim.current_date() >= last);
        last = sim.current_date();
    }
}

#[test]
fn test_prey_population_grows_without_predators() {
    let presenter = Rc::new(HeadlessPresenter::new(world()));
    let mut sim = Simulation::new(presenter);
    let prey = AgentGroup::prey(
        "prey",
        20,
        world(),
        GroupConfig::default(),
        PreyParams::default(),
        8,
    )
    .unwrap();
    let handle = sim.add_group(prey, 1).unwrap();
    sim.link_groups();

    sim.run(120);

    assert!(handle.borrow().len() > 20);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn agents_stay_in_bounds_and_under_speed(seed in any::<u64>(), events in 1u64..80) {
        let (mut sim, _) = stock_simulation(seed);
        sim.run(events);

        for group in sim.groups() {
            let group = group.borrow();
            for agent in group.agents() {
                prop_assert!(agent.is_alive());
                prop_assert!(agent.velocity.magnitude() <= agent.max_speed() + 1e-9);
                prop_assert!(world().contains(agent.position));
            }
        }
    }
}
