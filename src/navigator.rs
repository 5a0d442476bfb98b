//! # Navigator
//!
//! The caller-facing handle. A `Navigator` owns a data store and the
//! `GraphCache` built from it, turns logical endpoints (waypoint, room,
//! kiosk) into waypoint ids, and answers route, nearby-room, and audit
//! queries.
//!
//! Every write method delegates to the store and then invalidates the
//! cache, whether or not the write succeeded. Writes that bypass the
//! navigator (straight to `store()`) must be followed by `invalidate()`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditReport};
use crate::config::NavConfig;
use crate::graph::{GraphCache, GraphSnapshot};
use crate::instructions;
use crate::model::*;
use crate::resolver;
use crate::search::PathFinder;
use crate::storage::{MemoryStore, NavStore};
use crate::{Error, Result};

// ============================================================================
// Request / response
// ============================================================================

/// Endpoints of a navigation query.
///
/// Precedence per endpoint: explicit waypoint, then room. The kiosk is a
/// fallback for the start only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationRequest {
    pub start_waypoint_id: Option<WaypointId>,
    pub start_room_id: Option<RoomId>,
    pub end_waypoint_id: Option<WaypointId>,
    pub end_room_id: Option<RoomId>,
    pub kiosk_id: Option<KioskId>,
}

impl NavigationRequest {
    /// Waypoint to waypoint.
    pub fn between(start: impl Into<WaypointId>, end: impl Into<WaypointId>) -> Self {
        Self {
            start_waypoint_id: Some(start.into()),
            end_waypoint_id: Some(end.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationResponse {
    pub path: Vec<PathStep>,
    pub total_distance: f64,
    pub floor_changes: usize,
    pub estimated_time_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyRoom {
    pub room_id: RoomId,
    pub name: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Start => "Start",
            Endpoint::End => "End",
        }
    }
}

// ============================================================================
// Navigator
// ============================================================================

pub struct Navigator<S: NavStore> {
    store: S,
    cache: GraphCache,
}

impl<S: NavStore> Navigator<S> {
    /// Navigator over `store` with the default configuration.
    pub fn with_store(store: S) -> Self {
        Self { store, cache: GraphCache::default() }
    }

    /// Navigator over `store` with a validated configuration.
    pub fn with_config(store: S, config: NavConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, cache: GraphCache::new(config) })
    }

    /// Access the underlying store (for reads, or writes followed by `invalidate()`).
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    pub fn config(&self) -> &NavConfig {
        self.cache.config()
    }

    /// Drop the cached graph. The next query rebuilds it.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// The current graph, loading it if needed.
    pub async fn graph(&self) -> Result<Arc<GraphSnapshot>> {
        self.cache.load(&self.store).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Raw search between two waypoint ids. Unknown or unreachable endpoints
    /// yield `Route::unreachable()` rather than an error.
    pub async fn route(&self, start: &WaypointId, end: &WaypointId) -> Result<Route> {
        let graph = self.graph().await?;
        Ok(PathFinder::new(&graph, self.config()).find_path(start, end))
    }

    /// Resolve both endpoints, search, and annotate the route.
    pub async fn find_path(&self, request: &NavigationRequest) -> Result<NavigationResponse> {
        let graph = self.graph().await?;

        let start = self.resolve_endpoint(
            &graph,
            Endpoint::Start,
            request.start_waypoint_id.as_ref(),
            request.start_room_id,
            request.kiosk_id,
        ).await?;
        let end = self.resolve_endpoint(
            &graph,
            Endpoint::End,
            request.end_waypoint_id.as_ref(),
            request.end_room_id,
            None,
        ).await?;

        let (Some(start), Some(end)) = (start, end) else {
            return Err(Error::InvalidInput("Start and end waypoints required".into()));
        };
        for id in [&start, &end] {
            if !graph.contains(id) {
                return Err(Error::NotFound(format!("Waypoint {id}")));
            }
        }

        let mut route = PathFinder::new(&graph, self.config()).find_path(&start, &end);
        if !route.is_found() {
            return Err(Error::Unreachable { start, end });
        }
        instructions::annotate(&mut route.steps, |floor| graph.floor_number(floor));

        let floor_changes = route.floor_changes();
        let estimated_time_minutes = self.config().estimated_minutes(route.total_distance);
        tracing::debug!(
            start = %start,
            end = %end,
            steps = route.steps.len(),
            distance = route.total_distance,
            floor_changes,
            "navigation answered",
        );

        Ok(NavigationResponse {
            path: route.steps,
            total_distance: route.total_distance,
            floor_changes,
            estimated_time_minutes,
        })
    }

    /// Waypoint a room resolves to, or `None` when nothing fits.
    pub async fn resolve_room(&self, room: RoomId) -> Result<Option<WaypointId>> {
        let room = self.store.get_room(room).await?
            .ok_or_else(|| Error::NotFound(format!("Room {room}")))?;
        let graph = self.graph().await?;
        Ok(resolver::resolve_room(&graph, &room))
    }

    /// Rooms on the waypoint's floor whose assigned waypoint lies within
    /// `radius` (inclusive), nearest first. `None` uses the configured default.
    pub async fn nearby_rooms(&self, waypoint: &WaypointId, radius: Option<f64>) -> Result<Vec<NearbyRoom>> {
        let radius = radius.unwrap_or(self.config().nearby_radius);
        if radius.is_nan() || radius < 0.0 {
            return Err(Error::InvalidInput(format!("radius must be non-negative, got {radius}")));
        }

        let graph = self.graph().await?;
        let origin = graph.waypoint(waypoint)
            .ok_or_else(|| Error::NotFound(format!("Waypoint {waypoint}")))?;

        let mut nearby: Vec<NearbyRoom> = self.store.list_rooms(Some(origin.floor_id)).await?
            .into_iter()
            .filter_map(|room| {
                let wp = graph.waypoint(room.waypoint_id.as_ref()?)?;
                let distance = origin.distance_to(wp);
                (distance <= radius).then(|| NearbyRoom { room_id: room.id, name: room.name, distance })
            })
            .collect();
        nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(nearby)
    }

    /// Structural report over the whole graph.
    pub async fn audit_map(&self) -> Result<AuditReport> {
        let graph = self.graph().await?;
        Ok(audit::audit(&graph))
    }

    async fn resolve_endpoint(
        &self,
        graph: &GraphSnapshot,
        which: Endpoint,
        waypoint: Option<&WaypointId>,
        room: Option<RoomId>,
        kiosk: Option<KioskId>,
    ) -> Result<Option<WaypointId>> {
        if let Some(wp) = waypoint {
            return Ok(Some(wp.clone()));
        }

        if let Some(room_id) = room {
            let found = match self.store.get_room(room_id).await? {
                Some(room) => resolver::resolve_room(graph, &room),
                None => None,
            };
            return found.map(Some).ok_or_else(|| {
                Error::NotFound(format!("{} room {room_id} not found or has no waypoint", which.as_str()))
            });
        }

        if let Some(kiosk_id) = kiosk {
            let found = self.store.get_kiosk(kiosk_id).await?.and_then(|k| k.waypoint_id);
            return found.map(Some).ok_or_else(|| {
                Error::NotFound(format!("Kiosk {kiosk_id} not found or has no waypoint"))
            });
        }

        Ok(None)
    }

    // ========================================================================
    // Writes (invalidate the cache)
    // ========================================================================

    fn written<T>(&self, result: Result<T>) -> Result<T> {
        self.cache.invalidate();
        result
    }

    pub async fn create_floor(&self, floor: NewFloor) -> Result<Floor> {
        let result = self.store.create_floor(floor).await;
        self.written(result)
    }

    /// Renumbering changes both the search heuristic and up/down phrasing.
    pub async fn update_floor(&self, id: FloorId, patch: FloorPatch) -> Result<Floor> {
        let result = self.store.update_floor(id, patch).await;
        self.written(result)
    }

    pub async fn delete_floor(&self, id: FloorId) -> Result<bool> {
        let result = self.store.delete_floor(id).await;
        self.written(result)
    }

    pub async fn create_waypoint(&self, waypoint: Waypoint) -> Result<Waypoint> {
        let result = self.store.create_waypoint(waypoint).await;
        self.written(result)
    }

    pub async fn create_waypoints_batch(&self, waypoints: Vec<Waypoint>) -> Result<Vec<Waypoint>> {
        let result = self.store.create_waypoints_batch(waypoints).await;
        self.written(result)
    }

    pub async fn update_waypoint(&self, id: &WaypointId, patch: WaypointPatch) -> Result<Waypoint> {
        let result = self.store.update_waypoint(id, patch).await;
        self.written(result)
    }

    pub async fn delete_waypoint(&self, id: &WaypointId) -> Result<bool> {
        let result = self.store.delete_waypoint(id).await;
        self.written(result)
    }

    pub async fn create_connection(&self, connection: NewConnection) -> Result<Connection> {
        let result = self.store.create_connection(connection).await;
        self.written(result)
    }

    pub async fn create_connections_batch(&self, connections: Vec<NewConnection>) -> Result<Vec<Connection>> {
        let result = self.store.create_connections_batch(connections).await;
        self.written(result)
    }

    pub async fn delete_connection(&self, id: &ConnectionId) -> Result<bool> {
        let result = self.store.delete_connection(id).await;
        self.written(result)
    }

    pub async fn create_room(&self, room: NewRoom) -> Result<Room> {
        let result = self.store.create_room(room).await;
        self.written(result)
    }

    pub async fn update_room(&self, id: RoomId, patch: RoomPatch) -> Result<Room> {
        let result = self.store.update_room(id, patch).await;
        self.written(result)
    }

    pub async fn assign_room_waypoint(&self, room: RoomId, waypoint: &WaypointId) -> Result<Room> {
        let result = self.store.assign_room_waypoint(room, waypoint).await;
        self.written(result)
    }

    pub async fn delete_room(&self, id: RoomId) -> Result<bool> {
        let result = self.store.delete_room(id).await;
        self.written(result)
    }

    pub async fn create_kiosk(&self, kiosk: NewKiosk) -> Result<Kiosk> {
        let result = self.store.create_kiosk(kiosk).await;
        self.written(result)
    }

    pub async fn update_kiosk(&self, id: KioskId, patch: KioskPatch) -> Result<Kiosk> {
        let result = self.store.update_kiosk(id, patch).await;
        self.written(result)
    }

    pub async fn delete_kiosk(&self, id: KioskId) -> Result<bool> {
        let result = self.store.delete_kiosk(id).await;
        self.written(result)
    }
}

/// In-memory navigator for testing and embedding.
impl Navigator<MemoryStore> {
    pub async fn open_memory() -> Result<Self> {
        Ok(Self::with_store(MemoryStore::new()))
    }
}
