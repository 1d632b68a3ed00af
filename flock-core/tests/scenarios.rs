use flock_core::rules::{alignment, cohesion, separation};
use flock_core::{Agent, AgentId, Error, Event, EventScheduler, FnEvent, Vector2D};
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

fn resting(id: u64, x: f64, y: f64) -> Agent {
    Agent::new(AgentId(id), Vector2D::new(x, y), Vector2D::zero(), 3.0, 0.1)
}

#[test]
fn test_three_in_a_row_cohesion() {
    let flock = vec![resting(0, 0.0, 0.0), resting(1, 1.0, 0.0), resting(2, 2.0, 0.0)];

    let left = cohesion(&flock[0], &flock, 10.0, TAU);
    assert!((left.x - 1.0).abs() < 1e-9);
    assert!(left.y.abs() < 1e-9);

    let right = cohesion(&flock[2], &flock, 10.0, TAU);
    assert!((right.x + 1.0).abs() < 1e-9);

    // The middle agent averages its neighbors, not itself.
    assert_eq!(cohesion(&flock[1], &flock, 10.0, TAU), Vector2D::zero());
}

#[test]
fn test_single_agent_has_no_flocking_forces() {
    let flock = vec![resting(0, 50.0, 50.0)];
    let alone = &flock[0];

    assert_eq!(cohesion(alone, &flock, 100.0, TAU), Vector2D::zero());
    assert_eq!(alignment(alone, &flock, 100.0, TAU), Vector2D::zero());
    assert_eq!(separation(alone, &flock, 100.0, TAU), Vector2D::zero());
}

fn marker(seen: &Rc<RefCell<Vec<u64>>>) -> Box<dyn Event> {
    let seen = Rc::clone(seen);
    Box::new(FnEvent::new("marker", move |scheduler: &mut EventScheduler| {
        seen.borrow_mut().push(scheduler.current_date())
    }))
}

#[test]
fn test_scheduler_runs_two_four_six() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();
    for date in [4, 6, 2] {
        scheduler.add_event(date, marker(&seen)).unwrap();
    }

    scheduler.next();
    scheduler.next();
    scheduler.next();

    assert_eq!(*seen.borrow(), vec![2, 4, 6]);
    assert_eq!(scheduler.current_date(), 6);
    assert!(scheduler.is_empty());
}

#[test]
fn test_past_event_leaves_queue_unchanged() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();
    scheduler.add_event(3, marker(&seen)).unwrap();
    scheduler.add_event(8, marker(&seen)).unwrap();
    scheduler.next();

    assert_eq!(
        scheduler.add_event(1, marker(&seen)),
        Err(Error::EventInPast { date: 1, current: 3 })
    );
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.peek_date(), Some(8));
}
