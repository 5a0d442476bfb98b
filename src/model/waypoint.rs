//! Waypoint: a navigable point on a floor plan.

use serde::{Deserialize, Serialize};
use super::FloorId;

/// Opaque waypoint identifier, chosen by whoever draws the map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(pub String);

impl WaypointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WaypointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WaypointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What kind of place a waypoint marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointType {
    Hallway,
    Room,
    Stairs,
    Elevator,
    Hall,
}

impl WaypointType {
    /// Stairs and elevators are the only vertical-access points.
    pub fn is_vertical(self) -> bool {
        matches!(self, WaypointType::Stairs | WaypointType::Elevator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WaypointType::Hallway => "hallway",
            WaypointType::Room => "room",
            WaypointType::Stairs => "stairs",
            WaypointType::Elevator => "elevator",
            WaypointType::Hall => "hall",
        }
    }
}

impl std::fmt::Display for WaypointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A waypoint in image-pixel space on exactly one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub floor_id: FloorId,
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub kind: WaypointType,
    pub label: Option<String>,
    /// Legacy single-link vertical transition: floor of the target.
    pub connects_to_floor: Option<FloorId>,
    /// Legacy single-link vertical transition: target waypoint.
    pub connects_to_waypoint: Option<WaypointId>,
}

impl Waypoint {
    pub fn new(id: impl Into<WaypointId>, floor_id: FloorId, x: u32, y: u32, kind: WaypointType) -> Self {
        Self {
            id: id.into(),
            floor_id,
            x,
            y,
            kind,
            label: None,
            connects_to_floor: None,
            connects_to_waypoint: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the legacy vertical link.
    pub fn linked_to(mut self, floor: FloorId, target: impl Into<WaypointId>) -> Self {
        self.connects_to_floor = Some(floor);
        self.connects_to_waypoint = Some(target.into());
        self
    }

    pub fn position(&self) -> (f64, f64) {
        (f64::from(self.x), f64::from(self.y))
    }

    /// Planar distance, ignoring floors.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        super::euclidean(self.position(), other.position())
    }
}

/// Partial update of a waypoint. `None` leaves a field untouched; the
/// nested options of nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaypointPatch {
    pub floor_id: Option<FloorId>,
    pub x: Option<u32>,
    pub y: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<WaypointType>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub label: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub connects_to_floor: Option<Option<FloorId>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub connects_to_waypoint: Option<Option<WaypointId>>,
}

impl WaypointPatch {
    pub fn apply(&self, wp: &mut Waypoint) {
        if let Some(floor) = self.floor_id { wp.floor_id = floor; }
        if let Some(x) = self.x { wp.x = x; }
        if let Some(y) = self.y { wp.y = y; }
        if let Some(kind) = self.kind { wp.kind = kind; }
        if let Some(label) = &self.label { wp.label = label.clone(); }
        if let Some(floor) = self.connects_to_floor { wp.connects_to_floor = floor; }
        if let Some(target) = &self.connects_to_waypoint { wp.connects_to_waypoint = target.clone(); }
    }
}
