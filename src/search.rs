//! A* path search over a `GraphSnapshot`.
//!
//! The heuristic is straight-line distance plus a fixed penalty per floor of
//! separation. The penalty (100 by default) exceeds the cheapest vertical
//! link (30 for an elevator), so across floors the heuristic can overestimate
//! and the result is biased toward fewer floor changes rather than being
//! strictly optimal. On a single floor it is plain Euclidean distance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::config::NavConfig;
use crate::graph::GraphSnapshot;
use crate::model::{euclidean, PathStep, Route, WaypointId};

/// Entry in the open set. Ordered by `f`, then by insertion sequence so that
/// equal-priority entries pop in the order they were pushed.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f_score: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other.f_score.total_cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Path finder bound to one snapshot.
pub struct PathFinder<'g> {
    graph: &'g GraphSnapshot,
    config: &'g NavConfig,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g GraphSnapshot, config: &'g NavConfig) -> Self {
        Self { graph, config }
    }

    /// Estimated remaining cost between two arena indices.
    pub fn heuristic(&self, a: usize, b: usize) -> f64 {
        let wa = self.graph.waypoint_at(a);
        let wb = self.graph.waypoint_at(b);
        let planar = euclidean(wa.position(), wb.position());
        if wa.floor_id == wb.floor_id {
            return planar;
        }
        let floors = self.graph.floors_apart(wa.floor_id, wb.floor_id);
        planar + self.config.floor_penalty * f64::from(floors)
    }

    /// Find a route between two waypoints.
    ///
    /// Returns `Route::unreachable()` when either endpoint is not in the
    /// graph, when no path exists, or when the search budget runs out.
    pub fn find_path(&self, start: &WaypointId, goal: &WaypointId) -> Route {
        let (Some(start_idx), Some(goal_idx)) = (self.graph.index_of(start), self.graph.index_of(goal)) else {
            tracing::debug!(%start, %goal, "endpoint not in graph");
            return Route::unreachable();
        };

        if start_idx == goal_idx {
            return Route {
                steps: vec![PathStep::from(self.graph.waypoint_at(start_idx))],
                total_distance: 0.0,
            };
        }

        match self.search(start_idx, goal_idx) {
            Some((nodes, cost)) => {
                tracing::debug!(%start, %goal, hops = nodes.len() - 1, cost, "route found");
                Route {
                    steps: nodes.iter().map(|&i| PathStep::from(self.graph.waypoint_at(i))).collect(),
                    total_distance: cost,
                }
            }
            None => {
                tracing::debug!(%start, %goal, "no route");
                Route::unreachable()
            }
        }
    }

    /// A* proper. Returns arena indices from start to goal and the path cost.
    fn search(&self, start: usize, goal: usize) -> Option<(Vec<usize>, f64)> {
        let n = self.graph.waypoint_count();
        let mut g_score = vec![f64::INFINITY; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        let budget = self.config.search_budget();
        let started = Instant::now();

        g_score[start] = 0.0;
        open.push(OpenEntry { f_score: self.heuristic(start, goal), seq, node: start });

        while let Some(OpenEntry { node, .. }) = open.pop() {
            if let Some(limit) = budget {
                if started.elapsed() > limit {
                    tracing::warn!(?limit, expanded = seq, "search budget exhausted");
                    return None;
                }
            }

            if node == goal {
                return Some((reconstruct(&parent, goal), g_score[goal]));
            }

            // Skip stale heap entries
            if closed[node] {
                continue;
            }
            closed[node] = true;

            for edge in self.graph.edges(node) {
                if closed[edge.to] {
                    continue;
                }
                let tentative = g_score[node] + edge.weight;
                if tentative < g_score[edge.to] {
                    g_score[edge.to] = tentative;
                    parent[edge.to] = Some(node);
                    seq += 1;
                    open.push(OpenEntry {
                        f_score: tentative + self.heuristic(edge.to, goal),
                        seq,
                        node: edge.to,
                    });
                }
            }
        }

        None
    }
}

/// Walk parent pointers back from the goal, then reverse.
fn reconstruct(parent: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = parent[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
