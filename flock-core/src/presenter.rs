//! The narrow seam between the simulation and whatever displays it.

use crate::agent::{Agent, Bounds};
use crate::behavior::Role;
use std::cell::Cell;

/// One group's state as handed to [`Presenter::render`].
#[derive(Debug, Clone, Copy)]
pub struct GroupFrame<'a> {
    pub name: &'a str,
    pub role: Role,
    pub agents: &'a [Agent],
}

/// Presentation collaborator.
///
/// The simulation only asks for the viewport size and announces that a
/// redraw is due. `render` receives the full state when the driver draws.
pub trait Presenter {
    /// Current viewport size; groups adopt it as their bounds before each step.
    fn viewport(&self) -> Bounds;

    /// Called after every group step.
    fn request_redraw(&self);

    fn render(&self, _date: u64, _groups: &[GroupFrame<'_>]) {}
}

/// A presenter without a screen: fixed (but resizable) viewport, counted redraws.
#[derive(Debug)]
pub struct HeadlessPresenter {
    viewport: Cell<Bounds>,
    redraw_requests: Cell<u64>,
    renders: Cell<u64>,
}

impl HeadlessPresenter {
    pub fn new(viewport: Bounds) -> Self {
        Self {
            viewport: Cell::new(viewport),
            redraw_requests: Cell::new(0),
            renders: Cell::new(0),
        }
    }

    pub fn resize(&self, viewport: Bounds) {
        self.viewport.set(viewport);
    }

    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests.get()
    }

    pub fn renders(&self) -> u64 {
        self.renders.get()
    }
}

impl Presenter for HeadlessPresenter {
    fn viewport(&self) -> Bounds {
        self.viewport.get()
    }

    fn request_redraw(&self) {
        self.redraw_requests.set(self.redraw_requests.get() + 1);
    }

    fn render(&self, _date: u64, _groups: &[GroupFrame<'_>]) {
        self.renders.set(self.renders.get() + 1);
    }
}
