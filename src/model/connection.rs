//! Connection: an undirected, weighted edge between two waypoints.

use serde::{Deserialize, Serialize};
use super::WaypointId;

/// Opaque connection identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A connection between two waypoints. `from`/`to` carry no direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(rename = "from_waypoint_id")]
    pub from: WaypointId,
    #[serde(rename = "to_waypoint_id")]
    pub to: WaypointId,
    pub distance: f64,
}

impl Connection {
    pub fn new(
        id: impl Into<ConnectionId>,
        from: impl Into<WaypointId>,
        to: impl Into<WaypointId>,
        distance: f64,
    ) -> Self {
        Self { id: id.into(), from: from.into(), to: to.into(), distance }
    }

    /// Endpoints in canonical order, used to detect duplicates in either direction.
    pub fn pair_key(&self) -> (&WaypointId, &WaypointId) {
        normalize_pair(&self.from, &self.to)
    }

    pub fn touches(&self, wp: &WaypointId) -> bool {
        &self.from == wp || &self.to == wp
    }
}

pub(crate) fn normalize_pair<'a>(a: &'a WaypointId, b: &'a WaypointId) -> (&'a WaypointId, &'a WaypointId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Payload for creating a connection. The store generates an id when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConnection {
    pub id: Option<ConnectionId>,
    #[serde(rename = "from_waypoint_id")]
    pub from: WaypointId,
    #[serde(rename = "to_waypoint_id")]
    pub to: WaypointId,
    pub distance: f64,
}

impl NewConnection {
    pub fn new(from: impl Into<WaypointId>, to: impl Into<WaypointId>, distance: f64) -> Self {
        Self { id: None, from: from.into(), to: to.into(), distance }
    }

    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = Some(id.into());
        self
    }
}
