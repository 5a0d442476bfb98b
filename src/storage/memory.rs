//! In-memory data store.
//!
//! This is the reference implementation of `NavStore`.
//! All tables live behind a single RwLock, so every write (including the
//! cascades) is applied atomically with respect to readers.
//!
//! Tables are `BTreeMap`s keyed by identifier: listings come back in id
//! order, which keeps resolver tie-breaking reproducible.
//!
//! Use this store for:
//! - Testing the graph cache, search engine and auditor
//! - Embedding the engine in kiosk software that ships its own map
//! - Replaying a map exported from the relational store

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::connection::normalize_pair;
use crate::model::*;
use crate::{Error, Result};
use super::NavStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory building map storage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    tables: RwLock<Tables>,
    next_floor_id: AtomicI64,
    next_room_id: AtomicI64,
    next_kiosk_id: AtomicI64,
    next_connection_id: AtomicU64,
}

#[derive(Default)]
struct Tables {
    floors: BTreeMap<FloorId, Floor>,
    waypoints: BTreeMap<WaypointId, Waypoint>,
    connections: BTreeMap<ConnectionId, Connection>,
    rooms: BTreeMap<RoomId, Room>,
    kiosks: BTreeMap<KioskId, Kiosk>,
}

impl Tables {
    fn require_floor(&self, id: FloorId) -> Result<&Floor> {
        self.floors.get(&id).ok_or_else(|| Error::NotFound(format!("Floor {id}")))
    }

    fn require_waypoint(&self, id: &WaypointId) -> Result<&Waypoint> {
        self.waypoints.get(id).ok_or_else(|| Error::NotFound(format!("Waypoint {id}")))
    }

    fn pair_exists(&self, a: &WaypointId, b: &WaypointId) -> bool {
        let key = normalize_pair(a, b);
        self.connections.values().any(|c| c.pair_key() == key)
    }

    fn check_connection(&self, conn: &NewConnection) -> Result<()> {
        if conn.from == conn.to {
            return Err(Error::InvalidInput("Connection endpoints must be different".into()));
        }
        if !(conn.distance.is_finite() && conn.distance > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Connection distance must be positive, got {}", conn.distance
            )));
        }
        self.require_waypoint(&conn.from)?;
        self.require_waypoint(&conn.to)?;
        if let Some(id) = &conn.id {
            if self.connections.contains_key(id) {
                return Err(Error::Conflict(format!("Connection id {id} already exists")));
            }
        }
        if self.pair_exists(&conn.from, &conn.to) {
            return Err(Error::Conflict(format!(
                "Connection between {} and {} already exists", conn.from, conn.to
            )));
        }
        Ok(())
    }

    fn check_waypoint_floors(&self, wp: &Waypoint) -> Result<()> {
        self.require_floor(wp.floor_id)?;
        if let Some(target_floor) = wp.connects_to_floor {
            self.require_floor(target_floor)?;
        }
        Ok(())
    }

    fn check_new_waypoint(&self, wp: &Waypoint) -> Result<()> {
        if wp.id.as_str().trim().is_empty() {
            return Err(Error::InvalidInput("Waypoint id must not be empty".into()));
        }
        self.check_waypoint_floors(wp)?;
        if self.waypoints.contains_key(&wp.id) {
            return Err(Error::Conflict(format!("Waypoint {} already exists", wp.id)));
        }
        Ok(())
    }

    /// Floor a room ends up on. Both references must exist and agree; a room
    /// without a floor adopts its waypoint's.
    fn settle_room_floor(&self, floor: Option<FloorId>, waypoint: Option<&WaypointId>) -> Result<Option<FloorId>> {
        if let Some(floor) = floor {
            self.require_floor(floor)?;
        }
        let Some(wp_id) = waypoint else {
            return Ok(floor);
        };
        let wp_floor = self.require_waypoint(wp_id)?.floor_id;
        match floor {
            Some(floor) if floor != wp_floor => Err(Error::InvalidInput(format!(
                "Waypoint {wp_id} does not belong to floor {floor}"
            ))),
            _ => Ok(Some(wp_floor)),
        }
    }

    fn check_kiosk(&self, floor: FloorId, waypoint: Option<&WaypointId>) -> Result<()> {
        self.require_floor(floor)?;
        if let Some(wp_id) = waypoint {
            if self.require_waypoint(wp_id)?.floor_id != floor {
                return Err(Error::InvalidInput(format!(
                    "Waypoint {wp_id} does not belong to floor {floor}"
                )));
            }
        }
        Ok(())
    }

    /// Drop every reference to the given waypoints outside the waypoint table.
    fn detach_waypoints(&mut self, removed: &HashSet<WaypointId>) {
        self.connections.retain(|_, c| !removed.contains(&c.from) && !removed.contains(&c.to));
        for room in self.rooms.values_mut() {
            if room.waypoint_id.as_ref().is_some_and(|wp| removed.contains(wp)) {
                room.waypoint_id = None;
            }
        }
        for kiosk in self.kiosks.values_mut() {
            if kiosk.waypoint_id.as_ref().is_some_and(|wp| removed.contains(wp)) {
                kiosk.waypoint_id = None;
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                tables: RwLock::new(Tables::default()),
                next_floor_id: AtomicI64::new(1),
                next_room_id: AtomicI64::new(1),
                next_kiosk_id: AtomicI64::new(1),
                next_connection_id: AtomicU64::new(1),
            }),
        }
    }

    /// Insert a connection without any integrity checks.
    ///
    /// Exists to reproduce rows written before the store enforced its rules
    /// (dangling endpoints, duplicates), which the map auditor must report.
    pub fn insert_raw_connection(&self, connection: Connection) {
        self.inner.tables.write().connections.insert(connection.id.clone(), connection);
    }

    /// Insert a waypoint without checking that its floor exists.
    pub fn insert_raw_waypoint(&self, waypoint: Waypoint) {
        self.inner.tables.write().waypoints.insert(waypoint.id.clone(), waypoint);
    }

    fn next_connection_id(&self, tables: &Tables) -> ConnectionId {
        loop {
            let n = self.inner.next_connection_id.fetch_add(1, Ordering::Relaxed);
            let id = ConnectionId(format!("conn-{n}"));
            if !tables.connections.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// NavStore impl
// ============================================================================

#[async_trait]
impl NavStore for MemoryStore {
    // ========================================================================
    // Floors
    // ========================================================================

    async fn list_floors(&self) -> Result<Vec<Floor>> {
        Ok(self.inner.tables.read().floors.values().cloned().collect())
    }

    async fn get_floor(&self, id: FloorId) -> Result<Option<Floor>> {
        Ok(self.inner.tables.read().floors.get(&id).cloned())
    }

    async fn create_floor(&self, floor: NewFloor) -> Result<Floor> {
        if floor.name.trim().is_empty() {
            return Err(Error::InvalidInput("Floor name must not be empty".into()));
        }
        let id = FloorId(self.inner.next_floor_id.fetch_add(1, Ordering::Relaxed));
        let floor = Floor {
            id,
            name: floor.name,
            floor_number: floor.floor_number,
            image_width: floor.image_width,
            image_height: floor.image_height,
        };
        self.inner.tables.write().floors.insert(id, floor.clone());
        Ok(floor)
    }

    async fn update_floor(&self, id: FloorId, patch: FloorPatch) -> Result<Floor> {
        if patch.name.as_ref().is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::InvalidInput("Floor name must not be empty".into()));
        }
        let mut tables = self.inner.tables.write();
        let floor = tables.floors.get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Floor {id}")))?;
        patch.apply(floor);
        Ok(floor.clone())
    }

    async fn delete_floor(&self, id: FloorId) -> Result<bool> {
        let mut tables = self.inner.tables.write();
        if !tables.floors.contains_key(&id) {
            return Ok(false);
        }

        let linked_from: Vec<&str> = tables.waypoints.values()
            .filter(|wp| wp.floor_id != id && wp.connects_to_floor == Some(id))
            .map(|wp| wp.id.as_str())
            .collect();
        if !linked_from.is_empty() {
            return Err(Error::Conflict(format!(
                "Floor {id} is the link target of waypoints {}", linked_from.join(", ")
            )));
        }

        tables.floors.remove(&id);
        let removed: HashSet<WaypointId> = tables.waypoints.values()
            .filter(|wp| wp.floor_id == id)
            .map(|wp| wp.id.clone())
            .collect();
        tables.waypoints.retain(|wp_id, _| !removed.contains(wp_id));
        tables.kiosks.retain(|_, kiosk| kiosk.floor_id != id);
        for room in tables.rooms.values_mut() {
            if room.floor_id == Some(id) {
                room.floor_id = None;
            }
        }
        tables.detach_waypoints(&removed);
        Ok(true)
    }

    // ========================================================================
    // Waypoints
    // ========================================================================

    async fn list_waypoints(&self) -> Result<Vec<Waypoint>> {
        Ok(self.inner.tables.read().waypoints.values().cloned().collect())
    }

    async fn get_waypoint(&self, id: &WaypointId) -> Result<Option<Waypoint>> {
        Ok(self.inner.tables.read().waypoints.get(id).cloned())
    }

    async fn create_waypoint(&self, waypoint: Waypoint) -> Result<Waypoint> {
        let mut tables = self.inner.tables.write();
        tables.check_new_waypoint(&waypoint)?;
        tables.waypoints.insert(waypoint.id.clone(), waypoint.clone());
        Ok(waypoint)
    }

    async fn create_waypoints_batch(&self, waypoints: Vec<Waypoint>) -> Result<Vec<Waypoint>> {
        let mut tables = self.inner.tables.write();

        let mut seen: HashSet<&WaypointId> = HashSet::new();
        for wp in &waypoints {
            tables.check_new_waypoint(wp)?;
            if !seen.insert(&wp.id) {
                return Err(Error::InvalidInput(format!("Duplicate waypoint id {} in request", wp.id)));
            }
        }

        for wp in &waypoints {
            tables.waypoints.insert(wp.id.clone(), wp.clone());
        }
        Ok(waypoints)
    }

    async fn update_waypoint(&self, id: &WaypointId, patch: WaypointPatch) -> Result<Waypoint> {
        let mut tables = self.inner.tables.write();
        let mut updated = tables.require_waypoint(id)?.clone();
        patch.apply(&mut updated);
        tables.check_waypoint_floors(&updated)?;
        tables.waypoints.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_waypoint(&self, id: &WaypointId) -> Result<bool> {
        let mut tables = self.inner.tables.write();
        if tables.waypoints.remove(id).is_none() {
            return Ok(false);
        }
        let removed = HashSet::from([id.clone()]);
        tables.detach_waypoints(&removed);
        Ok(true)
    }

    // ========================================================================
    // Connections
    // ========================================================================

    async fn list_connections(&self) -> Result<Vec<Connection>> {
        Ok(self.inner.tables.read().connections.values().cloned().collect())
    }

    async fn create_connection(&self, connection: NewConnection) -> Result<Connection> {
        let mut tables = self.inner.tables.write();
        tables.check_connection(&connection)?;
        let id = match connection.id {
            Some(id) => id,
            None => self.next_connection_id(&tables),
        };
        let conn = Connection { id, from: connection.from, to: connection.to, distance: connection.distance };
        tables.connections.insert(conn.id.clone(), conn.clone());
        Ok(conn)
    }

    async fn create_connections_batch(&self, connections: Vec<NewConnection>) -> Result<Vec<Connection>> {
        let mut tables = self.inner.tables.write();

        let mut seen_pairs: HashSet<(WaypointId, WaypointId)> = HashSet::new();
        let mut seen_ids: HashSet<&ConnectionId> = HashSet::new();
        for conn in &connections {
            tables.check_connection(conn)?;
            let (a, b) = normalize_pair(&conn.from, &conn.to);
            if !seen_pairs.insert((a.clone(), b.clone())) {
                return Err(Error::InvalidInput(format!(
                    "Duplicate connection between {a} and {b} in request"
                )));
            }
            if let Some(id) = &conn.id {
                if !seen_ids.insert(id) {
                    return Err(Error::InvalidInput(format!("Duplicate connection id {id} in request")));
                }
            }
        }

        let mut created = Vec::with_capacity(connections.len());
        for conn in connections {
            let id = match conn.id {
                Some(id) => id,
                None => self.next_connection_id(&tables),
            };
            let conn = Connection { id, from: conn.from, to: conn.to, distance: conn.distance };
            tables.connections.insert(conn.id.clone(), conn.clone());
            created.push(conn);
        }
        Ok(created)
    }

    async fn delete_connection(&self, id: &ConnectionId) -> Result<bool> {
        Ok(self.inner.tables.write().connections.remove(id).is_some())
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    async fn get_room(&self, id: RoomId) -> Result<Option<Room>> {
        Ok(self.inner.tables.read().rooms.get(&id).cloned())
    }

    async fn list_rooms(&self, floor: Option<FloorId>) -> Result<Vec<Room>> {
        let tables = self.inner.tables.read();
        Ok(tables.rooms.values()
            .filter(|room| floor.is_none() || room.floor_id == floor)
            .cloned()
            .collect())
    }

    async fn list_unassigned_rooms(&self, floor: Option<FloorId>) -> Result<Vec<Room>> {
        let tables = self.inner.tables.read();
        if let Some(id) = floor {
            tables.require_floor(id)?;
        }
        Ok(tables.rooms.values()
            .filter(|room| room.waypoint_id.is_none())
            .filter(|room| floor.is_none() || room.floor_id == floor)
            .cloned()
            .collect())
    }

    async fn create_room(&self, room: NewRoom) -> Result<Room> {
        let mut tables = self.inner.tables.write();
        let floor_id = tables.settle_room_floor(room.floor_id, room.waypoint_id.as_ref())?;

        let id = RoomId(self.inner.next_room_id.fetch_add(1, Ordering::Relaxed));
        let room = Room { id, name: room.name, floor_id, waypoint_id: room.waypoint_id };
        tables.rooms.insert(id, room.clone());
        Ok(room)
    }

    async fn assign_room_waypoint(&self, room_id: RoomId, waypoint: &WaypointId) -> Result<Room> {
        let mut tables = self.inner.tables.write();
        let wp_floor = tables.require_waypoint(waypoint)?.floor_id;
        let room = tables.rooms.get_mut(&room_id)
            .ok_or_else(|| Error::NotFound(format!("Room {room_id}")))?;

        match room.floor_id {
            Some(floor) if floor != wp_floor => {
                return Err(Error::InvalidInput(format!(
                    "Waypoint {waypoint} does not belong to the floor of room {room_id}"
                )));
            }
            Some(_) => {}
            None => room.floor_id = Some(wp_floor),
        }
        room.waypoint_id = Some(waypoint.clone());
        Ok(room.clone())
    }

    async fn update_room(&self, id: RoomId, patch: RoomPatch) -> Result<Room> {
        let mut tables = self.inner.tables.write();
        let mut updated = tables.rooms.get(&id).cloned()
            .ok_or_else(|| Error::NotFound(format!("Room {id}")))?;
        patch.apply(&mut updated);
        updated.floor_id = tables.settle_room_floor(updated.floor_id, updated.waypoint_id.as_ref())?;
        tables.rooms.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_room(&self, id: RoomId) -> Result<bool> {
        Ok(self.inner.tables.write().rooms.remove(&id).is_some())
    }

    // ========================================================================
    // Kiosks
    // ========================================================================

    async fn get_kiosk(&self, id: KioskId) -> Result<Option<Kiosk>> {
        Ok(self.inner.tables.read().kiosks.get(&id).cloned())
    }

    async fn list_kiosks(&self) -> Result<Vec<Kiosk>> {
        Ok(self.inner.tables.read().kiosks.values().cloned().collect())
    }

    async fn create_kiosk(&self, kiosk: NewKiosk) -> Result<Kiosk> {
        let mut tables = self.inner.tables.write();
        tables.check_kiosk(kiosk.floor_id, kiosk.waypoint_id.as_ref())?;

        let id = KioskId(self.inner.next_kiosk_id.fetch_add(1, Ordering::Relaxed));
        let kiosk = Kiosk {
            id,
            name: kiosk.name,
            floor_id: kiosk.floor_id,
            waypoint_id: kiosk.waypoint_id,
            description: kiosk.description,
        };
        tables.kiosks.insert(id, kiosk.clone());
        Ok(kiosk)
    }

    async fn update_kiosk(&self, id: KioskId, patch: KioskPatch) -> Result<Kiosk> {
        let mut tables = self.inner.tables.write();
        let mut updated = tables.kiosks.get(&id).cloned()
            .ok_or_else(|| Error::NotFound(format!("Kiosk {id}")))?;
        patch.apply(&mut updated);
        tables.check_kiosk(updated.floor_id, updated.waypoint_id.as_ref())?;
        tables.kiosks.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_kiosk(&self, id: KioskId) -> Result<bool> {
        Ok(self.inner.tables.write().kiosks.remove(&id).is_some())
    }
}

// ============================================================================
// Tests
// ============================================================================
