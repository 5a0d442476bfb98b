//! Route: the ordered output of a path search.

use serde::Serialize;
use super::{FloorId, Instruction, Waypoint, WaypointId, WaypointType};

/// Snapshot of one waypoint along a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub waypoint_id: WaypointId,
    pub floor_id: FloorId,
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub kind: WaypointType,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Instruction>,
}

impl PathStep {
    pub fn position(&self) -> (f64, f64) {
        (f64::from(self.x), f64::from(self.y))
    }
}

impl From<&Waypoint> for PathStep {
    fn from(wp: &Waypoint) -> Self {
        Self {
            waypoint_id: wp.id.clone(),
            floor_id: wp.floor_id,
            x: wp.x,
            y: wp.y,
            kind: wp.kind,
            label: wp.label.clone(),
            instruction: None,
        }
    }
}

/// A route between two waypoints.
///
/// An unreachable result has no steps and an infinite `total_distance`,
/// which cannot be confused with a zero-cost (start == end) route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub steps: Vec<PathStep>,
    pub total_distance: f64,
}

impl Route {
    pub fn unreachable() -> Self {
        Self { steps: Vec::new(), total_distance: f64::INFINITY }
    }

    pub fn is_found(&self) -> bool {
        !self.steps.is_empty() && self.total_distance.is_finite()
    }

    /// Number of adjacent step pairs whose floor differs.
    pub fn floor_changes(&self) -> usize {
        self.steps.windows(2).filter(|w| w[0].floor_id != w[1].floor_id).count()
    }

    pub fn waypoint_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.waypoint_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_sentinel() {
        let r = Route::unreachable();
        assert!(!r.is_found());
        assert!(r.total_distance.is_infinite());
        assert_eq!(r.floor_changes(), 0);
    }

    #[test]
    fn test_floor_changes_counts_transitions() {
        let a = Waypoint::new("a", FloorId(1), 0, 0, WaypointType::Stairs);
        let b = Waypoint::new("b", FloorId(2), 0, 0, WaypointType::Stairs);
        let c = Waypoint::new("c", FloorId(2), 5, 0, WaypointType::Hallway);
        let route = Route {
            steps: vec![PathStep::from(&a), PathStep::from(&b), PathStep::from(&c)],
            total_distance: 55.0,
        };
        assert!(route.is_found());
        assert_eq!(route.floor_changes(), 1);
        assert_eq!(route.waypoint_ids(), vec!["a", "b", "c"]);
    }
}
