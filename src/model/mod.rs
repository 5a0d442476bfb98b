//! # Building Model
//!
//! Plain DTOs describing a multi-floor building: floors, waypoints, the
//! connections between waypoints, rooms and kiosks, plus the route types
//! produced by the search engine.
//!
//! Design rule: this module is pure data with no I/O or locking.
//! The data store owns identity and lifecycle; everything here is a value.

pub mod floor;
pub mod waypoint;
pub mod connection;
pub mod room;
pub mod instruction;
pub mod path;

pub use floor::{Floor, FloorId, FloorPatch, NewFloor};
pub use waypoint::{Waypoint, WaypointId, WaypointPatch, WaypointType};
pub use connection::{Connection, ConnectionId, NewConnection};
pub use room::{Kiosk, KioskId, KioskPatch, NewKiosk, NewRoom, Room, RoomId, RoomPatch};
pub use instruction::{Instruction, Transit, Turn, VerticalDirection};
pub use path::{PathStep, Route};

/// Euclidean distance between two planar points.
pub fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Deserializer for nullable patch fields: an absent key stays `None`, an
/// explicit `null` becomes `Some(None)`. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
