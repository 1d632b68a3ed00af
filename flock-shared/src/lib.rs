use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which behavior a group runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Prey,
    Predator,
}

/// Steering configuration of one group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SteeringSettings {
    pub vision_radius: f64,
    pub separation_distance: f64,
    pub max_speed: f64,
    pub max_force: f64,
    /// Full vision cone angle in radians
    pub field_of_view: f64,
    pub cohesion_weight: f64,
    pub alignment_weight: f64,
    pub separation_weight: f64,
}

impl Default for SteeringSettings {
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

impl SteeringSettings {
    /// Faster, wider-spaced steering with a narrower cone, suited to hunters.
    pub fn predator() -> Self {
        Self {
            vision_radius: 120.0,
            separation_distance: 40.0,
            max_speed: 3.5,
            max_force: 0.15,
            field_of_view: PI * 0.6,
            cohesion_weight: 0.8,
            alignment_weight: 0.8,
            separation_weight: 1.2,
        }
    }
}

/// Prey parameter overrides. Unset fields keep the simulation defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproduction_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproduction_min_age: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproduction_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproduction_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offspring_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_range_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flee_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fear_increment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wander_strength: Option<f64>,
}

/// Predator parameter overrides. Unset fields keep the simulation defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredatorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chase_range_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chase_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_reward: Option<f64>,
}

/// One group of a scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupSettings {
    pub name: String,
    pub role: RoleKind,
    pub count: usize,
    /// Ticks between two updates of this group
    pub delay: u64,
    #[serde(default)]
    pub steering: SteeringSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prey: Option<PreyOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predator: Option<PredatorOverrides>,
}

impl GroupSettings {
    pub fn prey(name: impl Into<String>, count: usize, delay: u64) -> Self {
        Self {
            name: name.into(),
            role: RoleKind::Prey,
            count,
            delay,
            steering: SteeringSettings::default(),
            prey: None,
            predator: None,
        }
    }

    pub fn predator(name: impl Into<String>, count: usize, delay: u64) -> Self {
        Self {
            name: name.into(),
            role: RoleKind::Predator,
            count,
            delay,
            steering: SteeringSettings::predator(),
            prey: None,
            predator: None,
        }
    }
}

/// A complete simulation setup, as read from a scenario file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSettings {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub seed: u64,
    pub groups: Vec<GroupSettings>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: 0,
            groups: vec![
                GroupSettings::prey("prey", 60, 1),
                GroupSettings::predator("predators", 8, 3),
            ],
        }
    }
}

impl ScenarioSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Live population of one group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupPopulation {
    pub name: String,
    pub role: RoleKind,
    pub alive: usize,
    pub mean_energy: f64,
}

/// Population of every group at one simulation date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationReport {
    pub date: u64,
    pub groups: Vec<GroupPopulation>,
}

impl PopulationReport {
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.alive).sum()
    }
}
