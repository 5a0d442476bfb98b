//! Engine configuration.
//!
//! Every knob has a default that reproduces the production constants, so
//! `NavConfig::default()` is what most callers want. A partial JSON document
//! overrides only the keys it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::WaypointType;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Cost of a legacy stairs link between floors.
    pub stairs_cost: f64,
    /// Cost of a legacy elevator link between floors.
    pub elevator_cost: f64,
    /// Heuristic penalty per floor of separation.
    pub floor_penalty: f64,
    /// Map units walked per minute, for time estimates.
    pub walking_speed: f64,
    /// Default radius for nearby-room lookups.
    pub nearby_radius: f64,
    /// How many times a cache load is retried when an invalidation races it.
    pub max_load_attempts: u32,
    /// Wall-clock limit for a single search. `None` means unbounded.
    pub search_budget_ms: Option<u64>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            stairs_cost: 50.0,
            elevator_cost: 30.0,
            floor_penalty: 100.0,
            walking_speed: 50.0,
            nearby_radius: 100.0,
            max_load_attempts: 3,
            search_budget_ms: None,
        }
    }
}

impl NavConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NavConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("stairs_cost", self.stairs_cost),
            ("elevator_cost", self.elevator_cost),
            ("walking_speed", self.walking_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.floor_penalty.is_finite() && self.floor_penalty >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "floor_penalty must be non-negative, got {}", self.floor_penalty
            )));
        }
        if !(self.nearby_radius.is_finite() && self.nearby_radius >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "nearby_radius must be non-negative, got {}", self.nearby_radius
            )));
        }
        if self.max_load_attempts == 0 {
            return Err(Error::InvalidInput("max_load_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Fixed cost of a legacy vertical link from a waypoint of this type.
    pub fn vertical_cost(&self, kind: WaypointType) -> Option<f64> {
        match kind {
            WaypointType::Stairs => Some(self.stairs_cost),
            WaypointType::Elevator => Some(self.elevator_cost),
            _ => None,
        }
    }

    pub fn search_budget(&self) -> Option<Duration> {
        self.search_budget_ms.map(Duration::from_millis)
    }

    pub fn estimated_minutes(&self, distance: f64) -> f64 {
        distance / self.walking_speed
    }
}
