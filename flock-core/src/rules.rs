//! Steering rules.
//!
//! Every rule is a pure function of an agent and the agents it can see.
//! Flocking rules return a unit vector (or zero when nobody is in view);
//! the caller weights them.

use crate::agent::Agent;
use crate::vector::Vector2D;
use core::f64::consts::TAU;
use rand::Rng;

/// Whether `target` lies inside the forward cone of `agent`.
///
/// A field of view of a full turn or more sees everything, including the
/// point directly behind. An agent at rest has no heading, so it sees a
/// target only when the field of view is wider than a half turn.
pub fn in_field_of_view(agent: &Agent, target: Vector2D, field_of_view: f64) -> bool {
    if field_of_view >= TAU {
        return true;
    }
    let heading = agent.velocity.normalize();
    let to_target = (target - agent.position).normalize();
    heading.dot(&to_target) > (field_of_view / 2.0).cos()
}

/// Other agents strictly within `radius` of `agent` and inside its field of view.
pub fn visible_neighbors<'a, I>(
    agent: &'a Agent,
    others: I,
    radius: f64,
    field_of_view: f64,
) -> impl Iterator<Item = &'a Agent> + 'a
where
    I: IntoIterator<Item = &'a Agent>,
    I::IntoIter: 'a,
{
    others.into_iter().filter(move |other| {
        if core::ptr::eq(*other, agent) {
            return false;
        }
        let distance = agent.position.distance(&other.position);
        distance > 0.0
            && distance < radius
            && in_field_of_view(agent, other.position, field_of_view)
    })
}

/// Unit vector toward the centroid of visible neighbors.
pub fn cohesion<'a, I>(agent: &'a Agent, others: I, vision_radius: f64, field_of_view: f64) -> Vector2D
where
    I: IntoIterator<Item = &'a Agent>,
    I::IntoIter: 'a,
{
    let mut sum = Vector2D::zero();
    let mut count = 0usize;

    for other in visible_neighbors(agent, others, vision_radius, field_of_view) {
        sum += other.position;
        count += 1;
    }

    if count == 0 {
        return Vector2D::zero();
    }
    (sum / count as f64 - agent.position).normalize()
}

/// Unit vector along the mean velocity of visible neighbors.
pub fn alignment<'a, I>(agent: &'a Agent, others: I, vision_radius: f64, field_of_view: f64) -> Vector2D
where
    I: IntoIterator<Item = &'a Agent>,
    I::IntoIter: 'a,
{
    let mut sum = Vector2D::zero();
    let mut count = 0usize;

    for other in visible_neighbors(agent, others, vision_radius, field_of_view) {
        sum += other.velocity;
        count += 1;
    }

    if count == 0 {
        return Vector2D::zero();
    }
    (sum / count as f64).normalize()
}

/// Unit vector away from neighbors closer than `separation_distance`,
/// each weighted by the inverse of its distance.
pub fn separation<'a, I>(
    agent: &'a Agent,
    others: I,
    separation_distance: f64,
    field_of_view: f64,
) -> Vector2D
where
    I: IntoIterator<Item = &'a Agent>,
    I::IntoIter: 'a,
{
    visible_neighbors(agent, others, separation_distance, field_of_view)
        .map(|other| {
            let distance = agent.position.distance(&other.position);
            (agent.position - other.position) / distance
        })
        .sum::<Vector2D>()
        .normalize()
}

/// Steering that turns `agent` toward `target` at full speed.
pub fn seek(agent: &Agent, target: Vector2D, max_speed: f64) -> Vector2D {
    let desired = (target - agent.position).normalize() * max_speed;
    desired - agent.velocity
}

/// Steering that turns `agent` directly away from `threat` at full speed.
pub fn flee(agent: &Agent, threat: Vector2D, max_speed: f64) -> Vector2D {
    let desired = (agent.position - threat).normalize() * max_speed;
    desired - agent.velocity
}

/// A uniformly random direction scaled by `strength`.
///
/// Non-deterministic unless `rng` is seeded.
pub fn wander<R: Rng + ?Sized>(strength: f64, rng: &mut R) -> Vector2D {
    Vector2D::from_angle(rng.gen_range(0.0..TAU)) * strength
}

/// Nearest agent to `from`, with its distance. `None` for an empty set.
pub fn find_closest<'a, I>(from: Vector2D, targets: I) -> Option<(&'a Agent, f64)>
where
    I: IntoIterator<Item = &'a Agent>,
{
    targets
        .into_iter()
        .map(|target| (target, from.distance(&target.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use core::f64::consts::PI;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f64 = 1e-9;

    fn agent(id: u64, x: f64, y: f64, vx: f64, vy: f64) -> Agent {
        Agent::new(AgentId(id), Vector2D::new(x, y), Vector2D::new(vx, vy), 3.0, 0.1)
    }

    fn line_of_three() -> Vec<Agent> {
        vec![
            agent(0, 0.0, 0.0, 0.0, 0.0),
            agent(1, 1.0, 0.0, 0.0, 0.0),
            agent(2, 2.0, 0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_isolated_agent_gets_zero_vectors() {
        let flock = vec![agent(0, 0.0, 0.0, 1.0, 0.0), agent(1, 500.0, 500.0, 1.0, 0.0)];
        let lonely = &flock[0];

        assert_eq!(cohesion(lonely, &flock, 10.0, TAU), Vector2D::zero());
        assert_eq!(alignment(lonely, &flock, 10.0, TAU), Vector2D::zero());
        assert_eq!(separation(lonely, &flock, 10.0, TAU), Vector2D::zero());
    }

    #[test]
    fn test_cohesion_points_toward_centroid() {
        let flock = line_of_three();

        let from_end = cohesion(&flock[0], &flock, 10.0, TAU);
        assert!((from_end.x - 1.0).abs() < EPSILON);
        assert!(from_end.y.abs() < EPSILON);

        // The middle agent sits on the centroid of its two neighbors.
        assert_eq!(cohesion(&flock[1], &flock, 10.0, TAU), Vector2D::zero());
    }

    #[test]
    fn test_field_of_view_hides_agents_behind() {
        let flock = vec![agent(0, 0.0, 0.0, 1.0, 0.0), agent(1, -5.0, 0.0, 0.0, 1.0)];

        assert_eq!(cohesion(&flock[0], &flock, 10.0, PI), Vector2D::zero());
        assert_eq!(alignment(&flock[0], &flock, 10.0, PI), Vector2D::zero());

        let toward = cohesion(&flock[0], &flock, 10.0, TAU);
        assert!((toward.x + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_alignment_averages_velocities() {
        let flock = vec![
            agent(0, 0.0, 0.0, 1.0, 0.0),
            agent(1, 1.0, 1.0, 0.0, 2.0),
            agent(2, 1.0, -1.0, 0.0, 2.0),
        ];
        let heading = alignment(&flock[0], &flock, 10.0, TAU);
        assert!(heading.x.abs() < EPSILON);
        assert!((heading.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_separation_pushes_away() {
        let flock = vec![agent(0, 0.0, 0.0, 0.0, 0.0), agent(1, 3.0, 0.0, 0.0, 0.0)];
        let push = separation(&flock[0], &flock, 5.0, TAU);
        assert!((push.x + 1.0).abs() < EPSILON);

        // Outside the separation distance nothing happens.
        assert_eq!(separation(&flock[0], &flock, 2.0, TAU), Vector2D::zero());
    }

    #[test]
    fn test_seek_and_flee_are_opposite_desires() {
        let hunter = agent(0, 0.0, 0.0, 0.0, 0.0);
        let target = Vector2D::new(10.0, 0.0);

        assert_eq!(seek(&hunter, target, 2.0), Vector2D::new(2.0, 0.0));
        assert_eq!(flee(&hunter, target, 2.0), Vector2D::new(-2.0, 0.0));

        let moving = agent(1, 0.0, 0.0, 1.0, 0.0);
        assert_eq!(seek(&moving, target, 2.0), Vector2D::new(1.0, 0.0));
    }

    #[test]
    fn test_wander_has_requested_strength() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let w = wander(0.3, &mut rng);
            assert!((w.magnitude() - 0.3).abs() < EPSILON);
        }
    }

    #[test]
    fn test_wander_is_reproducible_with_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(wander(1.0, &mut a), wander(1.0, &mut b));
    }

    #[test]
    fn test_find_closest() {
        let targets = vec![agent(0, 10.0, 0.0, 0.0, 0.0), agent(1, 3.0, 4.0, 0.0, 0.0)];
        let (closest, distance) = find_closest(Vector2D::zero(), &targets).unwrap();
        assert_eq!(closest.id(), AgentId(1));
        assert_eq!(distance, 5.0);

        assert!(find_closest(Vector2D::zero(), &Vec::new()).is_none());
    }
}
