//! # Data Store Trait
//!
//! This is THE contract between the navigation engine and whatever persists
//! the building map. The engine only needs the read half to build its graph;
//! the write half carries the integrity rules every store must enforce
//! (undirected duplicate detection, floor/waypoint agreement, cascades).
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |
//!
//! Writes made directly against a store do not reach any `GraphCache`.
//! Go through `Navigator`, or call `Navigator::invalidate()` afterwards.

pub mod memory;

use async_trait::async_trait;

use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// NavStore Trait
// ============================================================================

/// The data store contract.
///
/// Lookups return `Ok(None)` for missing entities; `Err` is reserved for
/// store failures and rule violations on writes.
#[async_trait]
pub trait NavStore: Send + Sync + 'static {
    // ========================================================================
    // Floors
    // ========================================================================

    async fn list_floors(&self) -> Result<Vec<Floor>>;

    async fn get_floor(&self, id: FloorId) -> Result<Option<Floor>>;

    async fn create_floor(&self, floor: NewFloor) -> Result<Floor>;

    /// Rename, renumber or resize a floor. `NotFound` if it does not exist.
    async fn update_floor(&self, id: FloorId, patch: FloorPatch) -> Result<Floor>;

    /// Delete a floor together with its waypoints, their connections and its
    /// kiosks. Rooms on the floor survive with no floor. Fails with `Conflict`
    /// while a waypoint on another floor links into it. Returns true if it
    /// existed.
    async fn delete_floor(&self, id: FloorId) -> Result<bool>;

    // ========================================================================
    // Waypoints
    // ========================================================================

    async fn list_waypoints(&self) -> Result<Vec<Waypoint>>;

    async fn get_waypoint(&self, id: &WaypointId) -> Result<Option<Waypoint>>;

    /// Waypoints of a single floor.
    ///
    /// Default: filters `list_waypoints()`.
    async fn waypoints_on_floor(&self, floor: FloorId) -> Result<Vec<Waypoint>> {
        let all = self.list_waypoints().await?;
        Ok(all.into_iter().filter(|wp| wp.floor_id == floor).collect())
    }

    /// Fails with `NotFound` when the floor (or `connects_to_floor`) does not
    /// exist, `Conflict` when the id is taken.
    async fn create_waypoint(&self, waypoint: Waypoint) -> Result<Waypoint>;

    /// All-or-nothing batch insert with the same checks as `create_waypoint`.
    /// An id repeated inside the batch is `InvalidInput`.
    async fn create_waypoints_batch(&self, waypoints: Vec<Waypoint>) -> Result<Vec<Waypoint>>;

    async fn update_waypoint(&self, id: &WaypointId, patch: WaypointPatch) -> Result<Waypoint>;

    /// Delete a waypoint and every connection touching it. Rooms and kiosks
    /// pointing at it lose their assignment. Returns true if it existed.
    async fn delete_waypoint(&self, id: &WaypointId) -> Result<bool>;

    // ========================================================================
    // Connections
    // ========================================================================

    async fn list_connections(&self) -> Result<Vec<Connection>>;

    /// Connections with at least one endpoint on the given floor.
    ///
    /// Default: scans all waypoints and connections.
    async fn connections_on_floor(&self, floor: FloorId) -> Result<Vec<Connection>> {
        let on_floor: Vec<WaypointId> = self.waypoints_on_floor(floor).await?
            .into_iter()
            .map(|wp| wp.id)
            .collect();
        let all = self.list_connections().await?;
        Ok(all.into_iter()
            .filter(|c| on_floor.iter().any(|wp| c.touches(wp)))
            .collect())
    }

    /// Fails with `InvalidInput` for a self-loop or non-positive distance,
    /// `NotFound` for a missing endpoint, `Conflict` when the unordered pair
    /// is already connected.
    async fn create_connection(&self, connection: NewConnection) -> Result<Connection>;

    /// All-or-nothing batch insert. A pair repeated inside the batch is
    /// `InvalidInput`.
    async fn create_connections_batch(&self, connections: Vec<NewConnection>) -> Result<Vec<Connection>>;

    async fn delete_connection(&self, id: &ConnectionId) -> Result<bool>;

    // ========================================================================
    // Rooms
    // ========================================================================

    async fn get_room(&self, id: RoomId) -> Result<Option<Room>>;

    /// Rooms, optionally restricted to one floor.
    async fn list_rooms(&self, floor: Option<FloorId>) -> Result<Vec<Room>>;

    /// Rooms with no waypoint assigned, optionally restricted to one floor.
    /// `NotFound` if the floor does not exist.
    ///
    /// Default: filters `list_rooms()`.
    async fn list_unassigned_rooms(&self, floor: Option<FloorId>) -> Result<Vec<Room>> {
        if let Some(id) = floor {
            if self.get_floor(id).await?.is_none() {
                return Err(crate::Error::NotFound(format!("Floor {id}")));
            }
        }
        let rooms = self.list_rooms(floor).await?;
        Ok(rooms.into_iter().filter(|room| room.waypoint_id.is_none()).collect())
    }

    async fn create_room(&self, room: NewRoom) -> Result<Room>;

    /// Patch a room. The resulting waypoint must lie on the resulting floor;
    /// a room left without a floor adopts its waypoint's.
    async fn update_room(&self, id: RoomId, patch: RoomPatch) -> Result<Room>;

    /// Attach a waypoint to a room. The waypoint must lie on the room's
    /// floor; a room without a floor adopts the waypoint's.
    async fn assign_room_waypoint(&self, room: RoomId, waypoint: &WaypointId) -> Result<Room>;

    async fn delete_room(&self, id: RoomId) -> Result<bool>;

    // ========================================================================
    // Kiosks
    // ========================================================================

    async fn get_kiosk(&self, id: KioskId) -> Result<Option<Kiosk>>;

    async fn list_kiosks(&self) -> Result<Vec<Kiosk>>;

    async fn create_kiosk(&self, kiosk: NewKiosk) -> Result<Kiosk>;

    /// Patch a kiosk. The resulting waypoint, when set, must lie on the
    /// resulting floor.
    async fn update_kiosk(&self, id: KioskId, patch: KioskPatch) -> Result<Kiosk>;

    async fn delete_kiosk(&self, id: KioskId) -> Result<bool>;
}
