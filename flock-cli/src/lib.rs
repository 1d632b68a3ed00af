//! Command-line front end for the flocking simulation.

pub mod console;
pub mod scenario;

pub use console::{drive, ConsolePresenter};
pub use scenario::build_simulation;
