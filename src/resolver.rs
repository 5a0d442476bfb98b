//! Room-to-waypoint resolution.
//!
//! A room either carries an assigned waypoint or is located through the
//! room-type waypoints of its floor: label matches first, then whichever
//! candidate is closest to the floor-plan center (or, without a plan, the
//! candidates' centroid).

use crate::graph::GraphSnapshot;
use crate::model::{euclidean, Room, Waypoint, WaypointId, WaypointType};

/// Resolve a room to a waypoint id, or `None` when nothing fits.
///
/// Ties on distance go to the earliest candidate in snapshot order.
pub fn resolve_room(graph: &GraphSnapshot, room: &Room) -> Option<WaypointId> {
    if let Some(wp) = &room.waypoint_id {
        return Some(wp.clone());
    }
    let floor_id = room.floor_id?;

    let on_floor: Vec<&Waypoint> = graph.waypoints().iter()
        .filter(|wp| wp.floor_id == floor_id && wp.kind == WaypointType::Room)
        .collect();
    if on_floor.is_empty() {
        tracing::debug!(room = %room.id, floor = %floor_id, "no room waypoints on floor");
        return None;
    }

    let name = room.name.trim().to_lowercase();
    let labelled: Vec<&Waypoint> = on_floor.iter()
        .copied()
        .filter(|wp| wp.label.as_deref().is_some_and(|l| l.trim().to_lowercase() == name))
        .collect();
    let candidates = if labelled.is_empty() { on_floor } else { labelled };

    let target = graph.floor(floor_id)
        .and_then(|f| f.plan_center())
        .unwrap_or_else(|| centroid(&candidates));

    let mut best: Option<(&Waypoint, f64)> = None;
    for wp in candidates {
        let d = euclidean(wp.position(), target);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((wp, d));
        }
    }
    best.map(|(wp, _)| wp.id.clone())
}

fn centroid(points: &[&Waypoint]) -> (f64, f64) {
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), wp| {
        let (x, y) = wp.position();
        (sx + x, sy + y)
    });
    (sx / n, sy / n)
}
