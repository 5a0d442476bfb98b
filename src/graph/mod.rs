//! # Graph Cache
//!
//! Holds the current `GraphSnapshot` and decides when to rebuild it.
//!
//! ## Lifecycle
//!
//! ```text
//!   empty ──load()──▶ loaded ──invalidate()──▶ empty
//!                       │  ▲
//!                       └──┘ load() is a no-op
//! ```
//!
//! The only mutations are "install a whole snapshot" and "drop it". Readers
//! clone the `Arc` and keep a consistent graph for as long as they hold it,
//! even if the cache is invalidated underneath them.
//!
//! No lock is held while the store is being read. Concurrent loads may each
//! build a snapshot; the first to install wins and the others adopt it. An
//! epoch counter, bumped by every `invalidate()`, stops a load that started
//! before an invalidation from installing what may be stale data.

pub mod snapshot;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::NavConfig;
use crate::model::WaypointId;
use crate::storage::NavStore;
use crate::{Error, Result};

pub use snapshot::{Adjacency, Edge, EdgeKind, GraphSnapshot};

/// Explicitly owned navigation graph cache. Construct one per map.
#[derive(Debug)]
pub struct GraphCache {
    config: NavConfig,
    current: RwLock<Option<Arc<GraphSnapshot>>>,
    epoch: AtomicU64,
}

impl GraphCache {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Number of invalidations so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Return the current snapshot, building it from the store if needed.
    ///
    /// Fails with `StaleSnapshot` if every attempt was overtaken by an
    /// `invalidate()`, rather than answering from a graph that may be void.
    pub async fn load<S: NavStore + ?Sized>(&self, store: &S) -> Result<Arc<GraphSnapshot>> {
        let attempts = self.config.max_load_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(snapshot) = self.current() {
                return Ok(snapshot);
            }

            let epoch = self.epoch();
            let built = GraphSnapshot::from_store(store, &self.config).await?;
            match self.install(built, epoch) {
                Some(snapshot) => return Ok(snapshot),
                None => tracing::warn!(attempt, "graph invalidated during load, rebuilding"),
            }
        }
        Err(Error::StaleSnapshot { attempts })
    }

    /// The loaded snapshot. Querying an unloaded cache is a programming error.
    pub fn snapshot(&self) -> Result<Arc<GraphSnapshot>> {
        self.current().ok_or(Error::CacheNotLoaded)
    }

    /// Look up a waypoint in the loaded snapshot.
    pub fn waypoint(&self, id: &WaypointId) -> Result<Option<crate::model::Waypoint>> {
        Ok(self.snapshot()?.waypoint(id).cloned())
    }

    /// Neighbours of a waypoint in the loaded snapshot.
    pub fn neighbors(&self, id: &WaypointId) -> Result<Option<Vec<(WaypointId, f64)>>> {
        Ok(self.snapshot()?.neighbors(id))
    }

    /// Drop the snapshot. The next `load()` rebuilds from the store.
    pub fn invalidate(&self) {
        let mut slot = self.current.write();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        if slot.take().is_some() {
            tracing::debug!(epoch = self.epoch(), "navigation graph invalidated");
        }
    }

    fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.current.read().clone()
    }

    /// Install `built` unless an invalidation happened since `epoch` was read.
    /// If another loader got there first, its snapshot is returned instead.
    fn install(&self, built: GraphSnapshot, epoch: u64) -> Option<Arc<GraphSnapshot>> {
        let mut slot = self.current.write();
        if self.epoch.load(Ordering::Acquire) != epoch {
            return None;
        }
        if let Some(existing) = slot.as_ref() {
            tracing::debug!("concurrent load already installed a graph");
            return Some(Arc::clone(existing));
        }
        let snapshot = Arc::new(built);
        *slot = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}
