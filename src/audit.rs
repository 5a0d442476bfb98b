//! # Map Auditor
//!
//! Structural diagnostics over a whole `GraphSnapshot`, for admin tooling.
//! Nothing here is on the request path and nothing here fails: every defect
//! is reported as data.
//!
//! | Check | Reported as |
//! |-------|-------------|
//! | Connected components (connections + legacy links, undirected) | `components` |
//! | Floors whose waypoints are all outside the largest component | `issues.disconnected_floors` |
//! | Floors without waypoints | `issues.empty_floors` |
//! | Legacy links to missing or non-reciprocal targets | `issues.legacy_links` |
//! | Connections with a missing endpoint | `issues.missing_waypoint_connections` |
//! | Stairs/elevators with no edge to another floor | `issues.vertical_gaps` |
//!
//! All traversal is iterative and linear in waypoints plus edges.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use serde::Serialize;

use crate::graph::GraphSnapshot;
use crate::model::{ConnectionId, FloorId, WaypointId, WaypointType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub summary: AuditSummary,
    /// Largest first.
    pub components: Vec<ComponentInfo>,
    pub issues: AuditIssues,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub floors: usize,
    pub waypoints: usize,
    pub connections: usize,
    pub components: usize,
    pub largest_component: usize,
    pub disconnected_floors: usize,
    pub empty_floors: usize,
    pub legacy_link_issues: usize,
    pub missing_waypoint_connections: usize,
    pub vertical_gaps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub size: usize,
    pub floors: Vec<FloorId>,
    /// First waypoint of the component in snapshot order, as a handle.
    pub sample_waypoint: WaypointId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditIssues {
    pub disconnected_floors: Vec<FloorId>,
    pub empty_floors: Vec<FloorId>,
    pub legacy_links: Vec<LegacyLinkIssue>,
    pub missing_waypoint_connections: Vec<MissingEndpoint>,
    pub vertical_gaps: Vec<VerticalGap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyIssueKind {
    TargetMissing,
    ReverseMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyLinkIssue {
    pub waypoint_id: WaypointId,
    pub target: WaypointId,
    pub kind: LegacyIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEndpoint {
    pub connection_id: ConnectionId,
    pub from: WaypointId,
    pub to: WaypointId,
    pub missing: Vec<WaypointId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerticalGap {
    pub waypoint_id: WaypointId,
    pub floor_id: FloorId,
    #[serde(rename = "type")]
    pub kind: WaypointType,
}

/// Run every check over the snapshot.
pub fn audit(graph: &GraphSnapshot) -> AuditReport {
    let (components, component_of) = connected_components(graph);

    let mut issues = AuditIssues {
        disconnected_floors: disconnected_floors(graph, &components, &component_of),
        empty_floors: empty_floors(graph),
        legacy_links: legacy_link_issues(graph),
        missing_waypoint_connections: missing_endpoints(graph),
        vertical_gaps: vertical_gaps(graph),
    };
    issues.disconnected_floors.sort();
    issues.empty_floors.sort();

    let summary = AuditSummary {
        floors: graph.floors().len(),
        waypoints: graph.waypoint_count(),
        connections: graph.connections().len(),
        components: components.len(),
        largest_component: components.first().map_or(0, |c| c.size),
        disconnected_floors: issues.disconnected_floors.len(),
        empty_floors: issues.empty_floors.len(),
        legacy_link_issues: issues.legacy_links.len(),
        missing_waypoint_connections: issues.missing_waypoint_connections.len(),
        vertical_gaps: issues.vertical_gaps.len(),
    };
    tracing::info!(
        components = summary.components,
        disconnected_floors = summary.disconnected_floors,
        legacy_link_issues = summary.legacy_link_issues,
        missing_waypoint_connections = summary.missing_waypoint_connections,
        vertical_gaps = summary.vertical_gaps,
        "map audit complete",
    );

    AuditReport {
        generated_at: Utc::now(),
        summary,
        components: components.into_iter().map(|c| c.info).collect(),
        issues,
    }
}

struct Component {
    id: usize,
    size: usize,
    info: ComponentInfo,
}

/// BFS labelling. Returns components sorted largest first (ties keep
/// discovery order) and the component label of every arena index.
fn connected_components(graph: &GraphSnapshot) -> (Vec<Component>, Vec<usize>) {
    const UNSEEN: usize = usize::MAX;
    let n = graph.waypoint_count();
    let mut component_of = vec![UNSEEN; n];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for root in 0..n {
        if component_of[root] != UNSEEN {
            continue;
        }
        let id = components.len();
        let mut size = 0;
        let mut floors = BTreeSet::new();

        component_of[root] = id;
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            size += 1;
            floors.insert(graph.waypoint_at(node).floor_id);
            for edge in graph.edges(node) {
                if component_of[edge.to] == UNSEEN {
                    component_of[edge.to] = id;
                    queue.push_back(edge.to);
                }
            }
        }

        components.push(Component {
            id,
            size,
            info: ComponentInfo {
                size,
                floors: floors.into_iter().collect(),
                sample_waypoint: graph.waypoint_at(root).id.clone(),
            },
        });
    }

    components.sort_by(|a, b| b.size.cmp(&a.size));
    (components, component_of)
}

fn disconnected_floors(graph: &GraphSnapshot, components: &[Component], component_of: &[usize]) -> Vec<FloorId> {
    let Some(largest) = components.first().map(|c| c.id) else {
        return Vec::new();
    };
    let mut with_waypoints = BTreeSet::new();
    let mut reached = HashSet::new();
    for (idx, wp) in graph.waypoints().iter().enumerate() {
        with_waypoints.insert(wp.floor_id);
        if component_of[idx] == largest {
            reached.insert(wp.floor_id);
        }
    }
    with_waypoints.into_iter().filter(|f| !reached.contains(f)).collect()
}

fn empty_floors(graph: &GraphSnapshot) -> Vec<FloorId> {
    let used: HashSet<FloorId> = graph.waypoints().iter().map(|wp| wp.floor_id).collect();
    graph.floors().iter()
        .map(|f| f.id)
        .filter(|id| !used.contains(id))
        .collect()
}

fn legacy_link_issues(graph: &GraphSnapshot) -> Vec<LegacyLinkIssue> {
    let mut issues = Vec::new();
    for wp in graph.waypoints() {
        let Some(target_id) = &wp.connects_to_waypoint else {
            continue;
        };
        let kind = match graph.waypoint(target_id) {
            None => LegacyIssueKind::TargetMissing,
            Some(target) if target.connects_to_waypoint.as_ref() != Some(&wp.id) => LegacyIssueKind::ReverseMissing,
            Some(_) => continue,
        };
        issues.push(LegacyLinkIssue {
            waypoint_id: wp.id.clone(),
            target: target_id.clone(),
            kind,
        });
    }
    issues
}

fn missing_endpoints(graph: &GraphSnapshot) -> Vec<MissingEndpoint> {
    graph.connections().iter()
        .filter_map(|c| {
            let missing: Vec<WaypointId> = [&c.from, &c.to].into_iter()
                .filter(|id| !graph.contains(id))
                .cloned()
                .collect();
            (!missing.is_empty()).then(|| MissingEndpoint {
                connection_id: c.id.clone(),
                from: c.from.clone(),
                to: c.to.clone(),
                missing,
            })
        })
        .collect()
}

fn vertical_gaps(graph: &GraphSnapshot) -> Vec<VerticalGap> {
    graph.waypoints().iter()
        .enumerate()
        .filter(|(_, wp)| wp.kind.is_vertical())
        .filter(|(idx, wp)| {
            !graph.edges(*idx).iter().any(|e| graph.waypoint_at(e.to).floor_id != wp.floor_id)
        })
        .map(|(_, wp)| VerticalGap { waypoint_id: wp.id.clone(), floor_id: wp.floor_id, kind: wp.kind })
        .collect()
}
