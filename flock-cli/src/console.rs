//! A terminal presenter: fixed viewport, population reports instead of pixels.

use flock_core::{Bounds, GroupFrame, Presenter, Role, Simulation};
use flock_shared::{GroupPopulation, PopulationReport, RoleKind};
use std::cell::{Cell, RefCell};

#[derive(Debug)]
pub struct ConsolePresenter {
    viewport: Bounds,
    redraw_requests: Cell<u64>,
    pending: RefCell<Vec<PopulationReport>>,
}

impl ConsolePresenter {
    pub fn new(viewport: Bounds) -> Self {
        Self {
            viewport,
            redraw_requests: Cell::new(0),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests.get()
    }

    /// Reports rendered since the last call, oldest first.
    pub fn take_reports(&self) -> Vec<PopulationReport> {
        self.pending.take()
    }
}

fn role_kind(role: Role) -> RoleKind {
    match role {
        Role::Prey => RoleKind::Prey,
        Role::Predator => RoleKind::Predator,
    }
}

fn population(frame: &GroupFrame<'_>) -> GroupPopulation {
    let alive = frame.agents.len();
    let mean_energy = if alive == 0 {
        0.0
    } else {
        frame.agents.iter().map(|a| a.energy()).sum::<f64>() / alive as f64
    };
    GroupPopulation {
        name: frame.name.to_string(),
        role: role_kind(frame.role),
        alive,
        mean_energy,
    }
}

impl Presenter for ConsolePresenter {
    fn viewport(&self) -> Bounds {
        self.viewport
    }

    fn request_redraw(&self) {
        self.redraw_requests.set(self.redraw_requests.get() + 1);
    }

    fn render(&self, date: u64, groups: &[GroupFrame<'_>]) {
        let report = PopulationReport {
            date,
            groups: groups.iter().map(population).collect(),
        };
        log::trace!("Rendered {} agents at date {}", report.total(), date);
        self.pending.borrow_mut().push(report);
    }
}

/// Runs every event dated up to and including `until`.
///
/// The simulation is drawn after each date that is a multiple of `every`,
/// and once more at the last date reached, and each resulting report is
/// handed to `on_report`. Returns the number of events executed.
pub fn drive<F>(
    sim: &mut Simulation,
    presenter: &ConsolePresenter,
    until: u64,
    every: u64,
    mut on_report: F,
) -> u64
where
    F: FnMut(&PopulationReport),
{
    let every = every.max(1);
    let mut events = 0;
    let mut last_drawn = None;

    while let Some(date) = sim.scheduler().peek_date() {
        if date > until {
            break;
        }
        while sim.scheduler().peek_date() == Some(date) {
            sim.next();
            events += 1;
        }
        if date % every == 0 {
            flush(sim, presenter, &mut on_report);
            last_drawn = Some(date);
        }
    }

    if last_drawn != Some(sim.current_date()) {
        flush(sim, presenter, &mut on_report);
    }

    events
}

fn flush<F>(sim: &Simulation, presenter: &ConsolePresenter, on_report: &mut F)
where
    F: FnMut(&PopulationReport),
{
    sim.draw();
    for report in presenter.take_reports() {
        on_report(&report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::build_simulation;
    use flock_shared::ScenarioSettings;
    use std::rc::Rc;

    fn setup(seed: u64) -> (Simulation, Rc<ConsolePresenter>) {
        let scenario = ScenarioSettings {
            seed,
            ..ScenarioSettings::default()
        };
        let presenter = Rc::new(ConsolePresenter::new(
            Bounds::new(scenario.width, scenario.height).unwrap(),
        ));
        let sim = build_simulation(&scenario, presenter.clone()).unwrap();
        (sim, presenter)
    }

    #[test]
    fn test_render_summarizes_groups() {
        let (sim, presenter) = setup(1);
        sim.draw();

        let reports = presenter.take_reports();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.date, 0);
        assert_eq!(report.groups[0].role, RoleKind::Prey);
        assert_eq!(report.groups[0].alive, 60);
        assert_eq!(report.groups[0].mean_energy, 100.0);
        assert_eq!(report.groups[1].name, "predators");
        assert_eq!(report.total(), 68);

        assert!(presenter.take_reports().is_empty());
    }

    #[test]
    fn test_drive_reports_on_schedule() {
        let (mut sim, presenter) = setup(2);
        let mut dates = Vec::new();

        // Prey run every tick, predators every third: dates 0..=10 hold
        // 11 prey updates and 4 predator updates.
        let events = drive(&mut sim, &presenter, 10, 5, |report| dates.push(report.date));

        assert_eq!(events, 15);
        assert_eq!(presenter.redraw_requests(), 15);
        assert_eq!(dates, vec![0, 5, 10]);
        assert_eq!(sim.current_date(), 10);
        assert_eq!(sim.scheduler().peek_date(), Some(11));
    }

    #[test]
    fn test_drive_always_reports_the_last_date() {
        let (mut sim, presenter) = setup(3);
        let mut dates = Vec::new();

        drive(&mut sim, &presenter, 7, 5, |report| dates.push(report.date));

        assert_eq!(dates, vec![0, 5, 7]);
    }
}
