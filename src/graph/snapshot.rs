//! Immutable navigation graph built from one read of the data store.
//!
//! Waypoints live in an arena (`Vec<Waypoint>`) and every other structure
//! refers to them by arena index. Connections and legacy vertical links feed
//! the same adjacency list; nothing downstream needs to know which source an
//! edge came from except the auditor, which reads `Edge::kind`.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::config::NavConfig;
use crate::model::*;
use crate::storage::NavStore;
use crate::Result;

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A `Connection` row (inserted in both directions).
    Connection,
    /// A legacy `connects_to_waypoint` link on stairs or an elevator.
    Vertical,
}

/// Outgoing edge to the waypoint at arena index `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub weight: f64,
    pub kind: EdgeKind,
}

/// Most waypoints sit on a corridor and have two to four neighbours.
pub type Adjacency = SmallVec<[Edge; 4]>;

/// Read-only graph plus the lookups the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    waypoints: Vec<Waypoint>,
    index: HashMap<WaypointId, usize>,
    adjacency: Vec<Adjacency>,
    floors: Vec<Floor>,
    floor_numbers: HashMap<FloorId, i32>,
    /// Every connection row as read, including dangling ones.
    connections: Vec<Connection>,
    dropped_connections: usize,
}

impl GraphSnapshot {
    /// Read the store and build a snapshot.
    pub async fn from_store<S: NavStore + ?Sized>(store: &S, config: &NavConfig) -> Result<Self> {
        let floors = store.list_floors().await?;
        let waypoints = store.list_waypoints().await?;
        let connections = store.list_connections().await?;
        Ok(Self::build(floors, waypoints, connections, config))
    }

    /// Build from entity listings. Dangling references are dropped and logged.
    pub fn build(
        floors: Vec<Floor>,
        waypoints: Vec<Waypoint>,
        connections: Vec<Connection>,
        config: &NavConfig,
    ) -> Self {
        let mut index = HashMap::with_capacity(waypoints.len());
        for (i, wp) in waypoints.iter().enumerate() {
            if index.insert(wp.id.clone(), i).is_some() {
                tracing::warn!(waypoint = %wp.id, "duplicate waypoint id, keeping the last one");
            }
        }
        let mut adjacency: Vec<Adjacency> = vec![Adjacency::new(); waypoints.len()];

        let mut dropped_connections = 0;
        for conn in &connections {
            match (index.get(&conn.from), index.get(&conn.to)) {
                (Some(&a), Some(&b)) => {
                    adjacency[a].push(Edge { to: b, weight: conn.distance, kind: EdgeKind::Connection });
                    adjacency[b].push(Edge { to: a, weight: conn.distance, kind: EdgeKind::Connection });
                }
                _ => {
                    dropped_connections += 1;
                    tracing::warn!(
                        connection = %conn.id,
                        from = %conn.from,
                        to = %conn.to,
                        "connection references a missing waypoint, skipped",
                    );
                }
            }
        }

        for (a, wp) in waypoints.iter().enumerate() {
            let (Some(cost), Some(target)) = (config.vertical_cost(wp.kind), wp.connects_to_waypoint.as_ref()) else {
                continue;
            };
            match index.get(target) {
                Some(&b) if b != a => {
                    push_vertical(&mut adjacency[a], b, cost);
                    push_vertical(&mut adjacency[b], a, cost);
                }
                Some(_) => {
                    tracing::debug!(waypoint = %wp.id, "vertical link points at itself, ignored");
                }
                None => {
                    tracing::debug!(waypoint = %wp.id, target = %target, "vertical link target missing, ignored");
                }
            }
        }

        let floor_numbers = floors.iter().map(|f| (f.id, f.floor_number)).collect();

        let snapshot = Self {
            waypoints,
            index,
            adjacency,
            floors,
            floor_numbers,
            connections,
            dropped_connections,
        };
        tracing::info!(
            waypoints = snapshot.waypoint_count(),
            edges = snapshot.edge_count(),
            floors = snapshot.floors.len(),
            dropped_connections,
            "navigation graph built",
        );
        snapshot
    }

    // ========================================================================
    // Waypoints
    // ========================================================================

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Directed edge count (each connection counts twice).
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|adj| adj.len()).sum()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn index_of(&self, id: &WaypointId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &WaypointId) -> bool {
        self.index.contains_key(id)
    }

    pub fn waypoint(&self, id: &WaypointId) -> Option<&Waypoint> {
        self.index_of(id).map(|i| &self.waypoints[i])
    }

    /// Waypoint at an arena index. Panics on an index not handed out by this snapshot.
    pub fn waypoint_at(&self, idx: usize) -> &Waypoint {
        &self.waypoints[idx]
    }

    pub fn edges(&self, idx: usize) -> &[Edge] {
        &self.adjacency[idx]
    }

    /// Neighbours of a waypoint as (id, weight) pairs. `None` if unknown.
    pub fn neighbors(&self, id: &WaypointId) -> Option<Vec<(WaypointId, f64)>> {
        let idx = self.index_of(id)?;
        Some(self.adjacency[idx].iter()
            .map(|e| (self.waypoints[e.to].id.clone(), e.weight))
            .collect())
    }

    // ========================================================================
    // Floors
    // ========================================================================

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    pub fn floor_number(&self, id: FloorId) -> Option<i32> {
        self.floor_numbers.get(&id).copied()
    }

    /// Floors of separation, by floor number. A floor missing from the
    /// floor table counts as one floor away from any other floor.
    pub fn floors_apart(&self, a: FloorId, b: FloorId) -> u32 {
        if a == b {
            return 0;
        }
        match (self.floor_number(a), self.floor_number(b)) {
            (Some(x), Some(y)) => x.abs_diff(y),
            _ => 1,
        }
    }

    // ========================================================================
    // Raw rows
    // ========================================================================

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections skipped because an endpoint was missing.
    pub fn dropped_connections(&self) -> usize {
        self.dropped_connections
    }
}

fn push_vertical(adj: &mut Adjacency, to: usize, weight: f64) {
    let present = adj.iter().any(|e| e.kind == EdgeKind::Vertical && e.to == to && e.weight == weight);
    if !present {
        adj.push(Edge { to, weight, kind: EdgeKind::Vertical });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floors() -> Vec<Floor> {
        vec![Floor::new(FloorId(1), "Ground", 1), Floor::new(FloorId(2), "First", 2)]
    }

    #[test]
    fn test_connections_are_bidirectional() {
        let waypoints = vec![
            Waypoint::new("a", FloorId(1), 0, 0, WaypointType::Hallway),
            Waypoint::new("b", FloorId(1), 10, 0, WaypointType::Hallway),
        ];
        let connections = vec![Connection::new("c1", "a", "b", 7.5)];
        let g = GraphSnapshot::build(floors(), waypoints, connections, &NavConfig::default());

        assert_eq!(g.neighbors(&"a".into()), Some(vec![("b".into(), 7.5)]));
        assert_eq!(g.neighbors(&"b".into()), Some(vec![("a".into(), 7.5)]));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_dangling_connection_is_dropped() {
        let waypoints = vec![Waypoint::new("a", FloorId(1), 0, 0, WaypointType::Hallway)];
        let connections = vec![Connection::new("c1", "a", "ghost", 3.0)];
        let g = GraphSnapshot::build(floors(), waypoints, connections, &NavConfig::default());

        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.dropped_connections(), 1);
        assert_eq!(g.connections().len(), 1);
    }

    #[test]
    fn test_one_way_legacy_link_becomes_two_edges() {
        let waypoints = vec![
            Waypoint::new("s1", FloorId(1), 0, 0, WaypointType::Stairs).linked_to(FloorId(2), "s2"),
            Waypoint::new("s2", FloorId(2), 0, 0, WaypointType::Stairs),
            Waypoint::new("e1", FloorId(1), 5, 5, WaypointType::Elevator).linked_to(FloorId(2), "e2"),
            Waypoint::new("e2", FloorId(2), 5, 5, WaypointType::Elevator).linked_to(FloorId(1), "e1"),
        ];
        let g = GraphSnapshot::build(floors(), waypoints, Vec::new(), &NavConfig::default());

        assert_eq!(g.neighbors(&"s1".into()), Some(vec![("s2".into(), 50.0)]));
        assert_eq!(g.neighbors(&"s2".into()), Some(vec![("s1".into(), 50.0)]));
        // Reciprocal links do not produce duplicate edges
        assert_eq!(g.neighbors(&"e1".into()), Some(vec![("e2".into(), 30.0)]));
        assert_eq!(g.neighbors(&"e2".into()), Some(vec![("e1".into(), 30.0)]));
    }

    #[test]
    fn test_legacy_link_on_hallway_is_ignored() {
        let waypoints = vec![
            Waypoint::new("h1", FloorId(1), 0, 0, WaypointType::Hallway).linked_to(FloorId(2), "h2"),
            Waypoint::new("h2", FloorId(2), 0, 0, WaypointType::Hallway),
            Waypoint::new("s1", FloorId(1), 0, 0, WaypointType::Stairs).linked_to(FloorId(2), "gone"),
        ];
        let g = GraphSnapshot::build(floors(), waypoints, Vec::new(), &NavConfig::default());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_floors_apart_uses_floor_number() {
        let floors = vec![Floor::new(FloorId(10), "Basement", -1), Floor::new(FloorId(3), "Third", 3)];
        let g = GraphSnapshot::build(floors, Vec::new(), Vec::new(), &NavConfig::default());
        assert_eq!(g.floors_apart(FloorId(10), FloorId(3)), 4);
        assert_eq!(g.floors_apart(FloorId(3), FloorId(3)), 0);
        assert_eq!(g.floors_apart(FloorId(3), FloorId(99)), 1);
    }
}
