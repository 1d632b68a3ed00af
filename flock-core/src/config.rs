//! Configuration for agent groups and their roles.

use crate::error::{Error, Result};
use core::f64::consts::PI;

/// Steering configuration shared by every agent of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupConfig {
    pub vision_radius: f64,
    pub separation_distance: f64,
    pub max_speed: f64,
    pub max_force: f64,
    /// Full angle of the forward vision cone, in radians.
    pub field_of_view: f64,
    pub cohesion_weight: f64,
    pub alignment_weight: f64,
    pub separation_weight: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            vision_radius: 80.0,
            separation_distance: 25.0,
            max_speed: 2.5,
            max_force: 0.2,
            field_of_view: PI * 0.9,
            cohesion_weight: 1.0,
            alignment_weight: 1.0,
            separation_weight: 1.5,
        }
    }
}

impl GroupConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_speed > 0.0) || !self.max_speed.is_finite() {
            return Err(Error::InvalidMaxSpeed(self.max_speed));
        }
        if !(self.max_force > 0.0) || !self.max_force.is_finite() {
            return Err(Error::InvalidMaxForce(self.max_force));
        }
        non_negative("vision_radius", self.vision_radius)?;
        non_negative("separation_distance", self.separation_distance)?;
        non_negative("field_of_view", self.field_of_view)?;
        finite("cohesion_weight", self.cohesion_weight)?;
        finite("alignment_weight", self.alignment_weight)?;
        finite("separation_weight", self.separation_weight)?;
        Ok(())
    }
}

/// Parameters specific to prey groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreyParams {
    /// Energy lost every tick.
    pub fatigue_rate: f64,
    pub reproduction_energy: f64,
    pub reproduction_min_age: u64,
    /// Chance per tick that an eligible prey reproduces.
    pub reproduction_probability: f64,
    pub reproduction_cost: f64,
    /// Offspring appear within this offset of the parent on each axis.
    pub offspring_spread: f64,
    /// Predators are noticed within `vision_radius * detection_range_factor`.
    pub detection_range_factor: f64,
    pub flee_weight: f64,
    pub fear_increment: f64,
    pub wander_strength: f64,
}

impl Default for PreyParams {
    fn default() -> Self {
        Self {
            fatigue_rate: 0.1,
            reproduction_energy: 80.0,
            reproduction_min_age: 50,
            reproduction_probability: 0.07,
            reproduction_cost: 30.0,
            offspring_spread: 10.0,
            detection_range_factor: 1.2,
            flee_weight: 3.0,
            fear_increment: 0.1,
            wander_strength: 0.3,
        }
    }
}

impl PreyParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("fatigue_rate", self.fatigue_rate)?;
        non_negative("reproduction_energy", self.reproduction_energy)?;
        probability("reproduction_probability", self.reproduction_probability)?;
        non_negative("reproduction_cost", self.reproduction_cost)?;
        positive("offspring_spread", self.offspring_spread)?;
        non_negative("detection_range_factor", self.detection_range_factor)?;
        finite("flee_weight", self.flee_weight)?;
        non_negative("fear_increment", self.fear_increment)?;
        non_negative("wander_strength", self.wander_strength)?;
        Ok(())
    }
}

/// Parameters specific to predator groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredatorParams {
    /// Energy lost every tick.
    pub fatigue_rate: f64,
    /// Prey are chased within `vision_radius * chase_range_factor`.
    pub chase_range_factor: f64,
    pub chase_weight: f64,
    pub capture_radius: f64,
    pub capture_reward: f64,
}

impl Default for PredatorParams {
    fn default() -> Self {
        Self {
            fatigue_rate: 0.5,
            chase_range_factor: 2.0,
            chase_weight: 2.0,
            capture_radius: 10.0,
            capture_reward: 40.0,
        }
    }
}

impl PredatorParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("fatigue_rate", self.fatigue_rate)?;
        non_negative("chase_range_factor", self.chase_range_factor)?;
        finite("chase_weight", self.chase_weight)?;
        non_negative("capture_radius", self.capture_radius)?;
        non_negative("capture_reward", self.capture_reward)?;
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("must be finite, got {value}"),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(Error::InvalidParameter {
            name,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(Error::InvalidParameter {
            name,
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

fn probability(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidParameter {
            name,
            reason: format!("must lie in [0, 1], got {value}"),
        });
    }
    Ok(())
}
