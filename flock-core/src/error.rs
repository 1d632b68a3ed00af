//! Error types for the simulation core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("agent count must be positive, got {0}")]
    InvalidCount(usize),

    #[error("max speed must be positive, got {0}")]
    InvalidMaxSpeed(f64),

    #[error("max force must be positive, got {0}")]
    InvalidMaxForce(f64),

    #[error("bounds must be positive, got {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("update delay must be at least one tick")]
    InvalidDelay,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("cannot schedule an event at date {date}, current date is {current}")]
    EventInPast { date: u64, current: u64 },
}
