//! Rooms and kiosks: logical endpoints that resolve to waypoints.

use serde::{Deserialize, Serialize};
use super::{FloorId, WaypointId};

/// Opaque room identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub i64);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named room. It has no coordinates of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub floor_id: Option<FloorId>,
    pub waypoint_id: Option<WaypointId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: String,
    pub floor_id: Option<FloorId>,
    pub waypoint_id: Option<WaypointId>,
}

impl NewRoom {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn on_floor(mut self, floor: FloorId) -> Self {
        self.floor_id = Some(floor);
        self
    }

    pub fn at_waypoint(mut self, wp: impl Into<WaypointId>) -> Self {
        self.waypoint_id = Some(wp.into());
        self
    }
}

/// Partial update of a room. `floor_id` and `waypoint_id` take `Some(None)`
/// to clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<Option<FloorId>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<Option<WaypointId>>,
}

impl RoomPatch {
    pub fn apply(&self, room: &mut Room) {
        if let Some(name) = &self.name { room.name = name.clone(); }
        if let Some(floor) = self.floor_id { room.floor_id = floor; }
        if let Some(wp) = &self.waypoint_id { room.waypoint_id = wp.clone(); }
    }
}

/// Opaque kiosk identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KioskId(pub i64);

impl std::fmt::Display for KioskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An information kiosk; its waypoint is the physical access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kiosk {
    pub id: KioskId,
    pub name: String,
    pub floor_id: FloorId,
    pub waypoint_id: Option<WaypointId>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewKiosk {
    pub name: String,
    pub floor_id: FloorId,
    pub waypoint_id: Option<WaypointId>,
    pub description: Option<String>,
}

impl NewKiosk {
    pub fn new(name: impl Into<String>, floor_id: FloorId) -> Self {
        Self { name: name.into(), floor_id, waypoint_id: None, description: None }
    }

    pub fn at_waypoint(mut self, wp: impl Into<WaypointId>) -> Self {
        self.waypoint_id = Some(wp.into());
        self
    }
}

/// Partial update of a kiosk. A kiosk always has a floor; `waypoint_id` and
/// `description` take `Some(None)` to clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KioskPatch {
    pub name: Option<String>,
    pub floor_id: Option<FloorId>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<Option<WaypointId>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl KioskPatch {
    pub fn apply(&self, kiosk: &mut Kiosk) {
        if let Some(name) = &self.name { kiosk.name = name.clone(); }
        if let Some(floor) = self.floor_id { kiosk.floor_id = floor; }
        if let Some(wp) = &self.waypoint_id { kiosk.waypoint_id = wp.clone(); }
        if let Some(description) = &self.description { kiosk.description = description.clone(); }
    }
}
