//! End-to-end tests for the `Navigator` facade.
//!
//! Covers endpoint resolution (waypoint, room, kiosk), nearby-room lookups,
//! and the cache lifecycle as seen through writes.

use indoor_nav::{
    Error, FloorId, FloorPatch, KioskPatch, MemoryStore, NavStore, NavigationRequest, Navigator,
    NewConnection, NewFloor, NewKiosk, NewRoom, RoomId, RoomPatch, Waypoint, WaypointId,
    WaypointPatch, WaypointType,
};
use pretty_assertions::assert_eq;

/// One floor (600x400 plan) with a corridor `h0 - h1 - h2` and two room
/// waypoints hanging off it.
async fn setup_floor() -> (Navigator<MemoryStore>, FloorId) {
    let nav = Navigator::open_memory().await.unwrap();
    let floor = nav.create_floor(NewFloor::new("Ground", 1).with_image(600, 400)).await.unwrap().id;

    let waypoints = [
        Waypoint::new("h0", floor, 0, 200, WaypointType::Hallway),
        Waypoint::new("h1", floor, 300, 200, WaypointType::Hallway),
        Waypoint::new("h2", floor, 600, 200, WaypointType::Hallway),
        Waypoint::new("r-lib", floor, 290, 210, WaypointType::Room).with_label("Library"),
        Waypoint::new("r-lab", floor, 600, 100, WaypointType::Room).with_label("Lab"),
    ];
    for wp in waypoints {
        nav.create_waypoint(wp).await.unwrap();
    }
    nav.create_connections_batch(vec![
        NewConnection::new("h0", "h1", 300.0),
        NewConnection::new("h1", "h2", 300.0),
        NewConnection::new("h1", "r-lib", 15.0),
        NewConnection::new("h2", "r-lab", 100.0),
    ]).await.unwrap();

    (nav, floor)
}

fn ids(resp: &indoor_nav::NavigationResponse) -> Vec<&str> {
    resp.path.iter().map(|s| s.waypoint_id.as_str()).collect()
}

// ============================================================================
// 1. Endpoint resolution
// ============================================================================

#[tokio::test]
async fn test_room_endpoints_resolve_by_label() {
    let (nav, floor) = setup_floor().await;
    let lab = nav.create_room(NewRoom::new("  lab ").on_floor(floor)).await.unwrap();

    let req = NavigationRequest {
        start_waypoint_id: Some("h0".into()),
        end_room_id: Some(lab.id),
        ..Default::default()
    };
    let resp = nav.find_path(&req).await.unwrap();
    assert_eq!(ids(&resp), vec!["h0", "h1", "h2", "r-lab"]);
    assert_eq!(resp.total_distance, 700.0);
}

#[tokio::test]
async fn test_room_without_label_match_uses_plan_center() {
    let (nav, floor) = setup_floor().await;
    // Plan center is (300, 200); "r-lib" at (290, 210) is nearest
    let room = nav.create_room(NewRoom::new("Reading corner").on_floor(floor)).await.unwrap();
    assert_eq!(nav.resolve_room(room.id).await.unwrap(), Some("r-lib".into()));
}

#[tokio::test]
async fn test_assigned_waypoint_beats_label() {
    let (nav, floor) = setup_floor().await;
    let room = nav.create_room(NewRoom::new("Lab").on_floor(floor).at_waypoint("r-lib")).await.unwrap();
    assert_eq!(nav.resolve_room(room.id).await.unwrap(), Some("r-lib".into()));
}

#[tokio::test]
async fn test_explicit_waypoint_beats_room() {
    let (nav, floor) = setup_floor().await;
    let lab = nav.create_room(NewRoom::new("Lab").on_floor(floor)).await.unwrap();

    let req = NavigationRequest {
        start_waypoint_id: Some("h0".into()),
        end_waypoint_id: Some("h1".into()),
        end_room_id: Some(lab.id),
        ..Default::default()
    };
    let resp = nav.find_path(&req).await.unwrap();
    assert_eq!(ids(&resp), vec!["h0", "h1"]);
}

#[tokio::test]
async fn test_kiosk_is_start_fallback() {
    let (nav, floor) = setup_floor().await;
    let kiosk = nav.create_kiosk(NewKiosk::new("Front desk", floor).at_waypoint("h2")).await.unwrap();
    let library = nav.create_room(NewRoom::new("Library").on_floor(floor)).await.unwrap();

    let req = NavigationRequest {
        kiosk_id: Some(kiosk.id),
        end_room_id: Some(library.id),
        ..Default::default()
    };
    let resp = nav.find_path(&req).await.unwrap();
    assert_eq!(ids(&resp), vec!["h2", "h1", "r-lib"]);

    // A start room takes precedence over the kiosk
    let lab = nav.create_room(NewRoom::new("Lab").on_floor(floor)).await.unwrap();
    let req = NavigationRequest { start_room_id: Some(lab.id), ..req };
    let resp = nav.find_path(&req).await.unwrap();
    assert_eq!(resp.path[0].waypoint_id, WaypointId::from("r-lab"));
}

#[tokio::test]
async fn test_unresolvable_endpoints() {
    let (nav, _) = setup_floor().await;

    // Unknown room
    let req = NavigationRequest {
        start_waypoint_id: Some("h0".into()),
        end_room_id: Some(RoomId(999)),
        ..Default::default()
    };
    assert!(matches!(nav.find_path(&req).await, Err(Error::NotFound(_))));

    // Room with no floor and no waypoint
    let floating = nav.create_room(NewRoom::new("Nowhere")).await.unwrap();
    let req = NavigationRequest { end_room_id: Some(floating.id), ..req };
    assert!(matches!(nav.find_path(&req).await, Err(Error::NotFound(_))));

    // Kiosk without a waypoint
    let kiosk = nav.create_kiosk(NewKiosk::new("Unplaced", FloorId(1))).await.unwrap();
    let req = NavigationRequest {
        kiosk_id: Some(kiosk.id),
        end_waypoint_id: Some("h2".into()),
        ..Default::default()
    };
    assert!(matches!(nav.find_path(&req).await, Err(Error::NotFound(_))));

    // Nothing at all
    assert!(matches!(nav.find_path(&NavigationRequest::default()).await, Err(Error::InvalidInput(_))));
}

// ============================================================================
// 2. Nearby rooms
// ============================================================================

#[tokio::test]
async fn test_nearby_rooms_boundary_is_inclusive() {
    let nav = Navigator::open_memory().await.unwrap();
    let floor = nav.create_floor(NewFloor::new("Ground", 1)).await.unwrap().id;
    nav.create_waypoint(Waypoint::new("hall", floor, 0, 0, WaypointType::Hallway)).await.unwrap();
    nav.create_waypoint(Waypoint::new("far", floor, 6, 8, WaypointType::Room)).await.unwrap();
    nav.create_waypoint(Waypoint::new("near", floor, 3, 4, WaypointType::Room)).await.unwrap();

    let far = nav.create_room(NewRoom::new("Far").at_waypoint("far")).await.unwrap();
    let near = nav.create_room(NewRoom::new("Near").at_waypoint("near")).await.unwrap();
    nav.create_room(NewRoom::new("Unassigned").on_floor(floor)).await.unwrap();

    let within_five = nav.nearby_rooms(&"hall".into(), Some(5.0)).await.unwrap();
    assert_eq!(within_five.len(), 1);
    assert_eq!(within_five[0].room_id, near.id);
    assert_eq!(within_five[0].distance, 5.0);

    // Nearest first, regardless of creation order
    let within_ten = nav.nearby_rooms(&"hall".into(), Some(10.0)).await.unwrap();
    let found: Vec<RoomId> = within_ten.iter().map(|r| r.room_id).collect();
    assert_eq!(found, vec![near.id, far.id]);

    let within_default = nav.nearby_rooms(&"hall".into(), None).await.unwrap();
    assert_eq!(within_default.len(), 2);
}

#[tokio::test]
async fn test_nearby_rooms_same_floor_only() {
    let nav = Navigator::open_memory().await.unwrap();
    let ground = nav.create_floor(NewFloor::new("Ground", 1)).await.unwrap().id;
    let first = nav.create_floor(NewFloor::new("First", 2)).await.unwrap().id;
    nav.create_waypoint(Waypoint::new("hall", ground, 0, 0, WaypointType::Hallway)).await.unwrap();
    nav.create_waypoint(Waypoint::new("above", first, 0, 0, WaypointType::Room)).await.unwrap();
    nav.create_room(NewRoom::new("Above").at_waypoint("above")).await.unwrap();

    assert!(nav.nearby_rooms(&"hall".into(), Some(50.0)).await.unwrap().is_empty());
    assert!(matches!(nav.nearby_rooms(&"ghost".into(), None).await, Err(Error::NotFound(_))));
    assert!(matches!(nav.nearby_rooms(&"hall".into(), Some(-1.0)).await, Err(Error::InvalidInput(_))));
}

// ============================================================================
// 3. Cache lifecycle
// ============================================================================

#[tokio::test]
async fn test_writes_are_visible_to_the_next_query() {
    let (nav, floor) = setup_floor().await;
    let before = nav.route(&"h0".into(), &"h2".into()).await.unwrap();
    assert_eq!(before.total_distance, 600.0);

    // Shortcut
    nav.create_waypoint(Waypoint::new("bridge", floor, 300, 0, WaypointType::Hallway)).await.unwrap();
    nav.create_connection(NewConnection::new("h0", "bridge", 150.0)).await.unwrap();
    nav.create_connection(NewConnection::new("bridge", "h2", 150.0)).await.unwrap();
    let after = nav.route(&"h0".into(), &"h2".into()).await.unwrap();
    assert_eq!(after.waypoint_ids(), vec!["h0", "bridge", "h2"]);
    assert_eq!(after.total_distance, 300.0);

    // Removing the shortcut waypoint drops its connections too
    assert!(nav.delete_waypoint(&"bridge".into()).await.unwrap());
    let restored = nav.route(&"h0".into(), &"h2".into()).await.unwrap();
    assert_eq!(restored.total_distance, 600.0);
}

#[tokio::test]
async fn test_direct_store_writes_need_invalidate() {
    let (nav, floor) = setup_floor().await;
    nav.graph().await.unwrap();

    nav.store().create_waypoint(Waypoint::new("annex", floor, 0, 0, WaypointType::Hall)).await.unwrap();
    nav.store().create_connection(NewConnection::new("h0", "annex", 200.0)).await.unwrap();
    assert!(!nav.route(&"h0".into(), &"annex".into()).await.unwrap().is_found());

    nav.invalidate();
    assert_eq!(nav.route(&"h0".into(), &"annex".into()).await.unwrap().total_distance, 200.0);
}

#[tokio::test]
async fn test_update_waypoint_moves_room_target() {
    let (nav, floor) = setup_floor().await;
    let room = nav.create_room(NewRoom::new("Reading corner").on_floor(floor)).await.unwrap();
    assert_eq!(nav.resolve_room(room.id).await.unwrap(), Some("r-lib".into()));

    // Move the library away from the plan center; the lab is now closer
    let patch = WaypointPatch { x: Some(0), y: Some(0), ..Default::default() };
    nav.update_waypoint(&"r-lib".into(), patch).await.unwrap();
    assert_eq!(nav.resolve_room(room.id).await.unwrap(), Some("r-lab".into()));
}

#[tokio::test]
async fn test_delete_floor_cascades() {
    let (nav, floor) = setup_floor().await;
    let lab = nav.create_room(NewRoom::new("Lab").on_floor(floor).at_waypoint("r-lab")).await.unwrap();
    assert!(nav.delete_floor(floor).await.unwrap());

    let graph = nav.graph().await.unwrap();
    assert_eq!(graph.waypoint_count(), 0);
    assert!(graph.connections().is_empty());

    // The room is kept but no longer placed anywhere
    let lab = nav.store().get_room(lab.id).await.unwrap().unwrap();
    assert_eq!(lab.floor_id, None);
    assert_eq!(lab.waypoint_id, None);
    assert_eq!(nav.resolve_room(lab.id).await.unwrap(), None);
    assert_eq!(nav.store().list_unassigned_rooms(None).await.unwrap(), vec![lab]);
}

// ============================================================================
// 4. Map edits through the navigator
// ============================================================================

async fn stairs_between(nav: &Navigator<MemoryStore>) -> (FloorId, FloorId) {
    let ground = nav.create_floor(NewFloor::new("Ground", 1)).await.unwrap().id;
    let first = nav.create_floor(NewFloor::new("First", 2)).await.unwrap().id;
    nav.create_waypoints_batch(vec![
        Waypoint::new("s2", first, 0, 0, WaypointType::Stairs),
        Waypoint::new("s1", ground, 0, 0, WaypointType::Stairs).linked_to(first, "s2"),
        Waypoint::new("g", ground, 10, 0, WaypointType::Hallway),
        Waypoint::new("f", first, 10, 0, WaypointType::Hallway),
    ]).await.unwrap();
    nav.create_connections_batch(vec![
        NewConnection::new("g", "s1", 10.0),
        NewConnection::new("s2", "f", 10.0),
    ]).await.unwrap();
    (ground, first)
}

#[tokio::test]
async fn test_renumbering_a_floor_flips_direction() {
    let nav = Navigator::open_memory().await.unwrap();
    let (_, first) = stairs_between(&nav).await;

    let up = nav.find_path(&NavigationRequest::between("g", "f")).await.unwrap();
    assert_eq!(up.path[1].instruction.as_ref().map(ToString::to_string).as_deref(), Some("Take the stairs up to floor 2"));

    // The former first floor becomes a basement
    nav.update_floor(first, FloorPatch::renumber(0)).await.unwrap();
    let down = nav.find_path(&NavigationRequest::between("g", "f")).await.unwrap();
    assert_eq!(down.path[1].instruction.as_ref().map(ToString::to_string).as_deref(), Some("Take the stairs down to floor 0"));
    assert_eq!(down.total_distance, 70.0);
}

#[tokio::test]
async fn test_linked_floor_delete_needs_unlink_first() {
    let nav = Navigator::open_memory().await.unwrap();
    let (_, first) = stairs_between(&nav).await;

    assert!(matches!(nav.delete_floor(first).await, Err(Error::Conflict(_))));
    assert!(nav.route(&"s1".into(), &"s2".into()).await.unwrap().is_found());

    let unlink: WaypointPatch = serde_json::from_str(r#"{"connects_to_floor": null, "connects_to_waypoint": null}"#).unwrap();
    nav.update_waypoint(&"s1".into(), unlink).await.unwrap();
    assert!(nav.delete_floor(first).await.unwrap());

    let nudged = nav.update_waypoint(&"s1".into(), WaypointPatch { x: Some(5), ..Default::default() }).await.unwrap();
    assert_eq!(nudged.x, 5);
    assert!(nav.audit_map().await.unwrap().issues.legacy_links.is_empty());
}

#[tokio::test]
async fn test_update_room_retargets_navigation() {
    let (nav, _) = setup_floor().await;
    let room = nav.create_room(NewRoom::new("Archive")).await.unwrap();
    let req = NavigationRequest {
        start_waypoint_id: Some("h0".into()),
        end_room_id: Some(room.id),
        ..Default::default()
    };
    assert!(matches!(nav.find_path(&req).await, Err(Error::NotFound(_))));

    nav.update_room(room.id, RoomPatch { waypoint_id: Some(Some("r-lib".into())), ..Default::default() }).await.unwrap();
    assert_eq!(ids(&nav.find_path(&req).await.unwrap()), vec!["h0", "h1", "r-lib"]);
}

#[tokio::test]
async fn test_update_kiosk_moves_start() {
    let (nav, floor) = setup_floor().await;
    let kiosk = nav.create_kiosk(NewKiosk::new("Front desk", floor).at_waypoint("h0")).await.unwrap();
    let req = NavigationRequest {
        kiosk_id: Some(kiosk.id),
        end_waypoint_id: Some("h2".into()),
        ..Default::default()
    };
    assert_eq!(nav.find_path(&req).await.unwrap().total_distance, 600.0);

    nav.update_kiosk(kiosk.id, KioskPatch { waypoint_id: Some(Some("h1".into())), ..Default::default() }).await.unwrap();
    assert_eq!(ids(&nav.find_path(&req).await.unwrap()), vec!["h1", "h2"]);
}
