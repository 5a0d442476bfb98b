//! # indoor-nav: Multi-Floor Indoor Navigation Engine
//!
//! Shortest paths across the floors of a building, with turn-by-turn
//! instructions and structural diagnostics for the map.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `NavStore` is the contract between the engine and whatever persists the map
//! 2. **Clean DTOs**: `Floor`, `Waypoint`, `Connection`, `Room` cross all boundaries
//! 3. **Snapshot, never patch**: the graph cache is replaced or dropped whole
//! 4. **Owned cache**: each `Navigator` owns its `GraphCache`; there is no global state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use indoor_nav::{Navigator, NavigationRequest, NewConnection, NewFloor, Waypoint, WaypointType};
//!
//! # async fn example() -> indoor_nav::Result<()> {
//! let nav = Navigator::open_memory().await?;
//!
//! let ground = nav.create_floor(NewFloor::new("Ground", 1)).await?;
//! nav.create_waypoint(Waypoint::new("entrance", ground.id, 0, 0, WaypointType::Hallway)).await?;
//! nav.create_waypoint(Waypoint::new("lobby", ground.id, 40, 0, WaypointType::Hall)).await?;
//! nav.create_connection(NewConnection::new("entrance", "lobby", 40.0)).await?;
//!
//! let response = nav.find_path(&NavigationRequest::between("entrance", "lobby")).await?;
//! for step in &response.path {
//!     println!("{} {:?}", step.waypoint_id, step.instruction);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Stores
//!
//! | Store | Description |
//! |-------|-------------|
//! | `MemoryStore` | In-memory map for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod storage;
pub mod graph;
pub mod search;
pub mod instructions;
pub mod resolver;
pub mod audit;
pub mod navigator;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Floor, FloorId, FloorPatch, NewFloor,
    Waypoint, WaypointId, WaypointPatch, WaypointType,
    Connection, ConnectionId, NewConnection,
    Room, RoomId, RoomPatch, NewRoom, Kiosk, KioskId, KioskPatch, NewKiosk,
    Instruction, Transit, Turn, VerticalDirection,
    PathStep, Route,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use config::NavConfig;
pub use storage::{NavStore, MemoryStore};
pub use graph::{GraphCache, GraphSnapshot};
pub use search::PathFinder;
pub use audit::{AuditReport, AuditSummary, LegacyIssueKind};
pub use navigator::{Navigator, NavigationRequest, NavigationResponse, NearbyRoom};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No path found from {start} to {end}")]
    Unreachable { start: WaypointId, end: WaypointId },

    #[error("Navigation graph is not loaded")]
    CacheNotLoaded,

    #[error("Navigation graph was invalidated during {attempts} consecutive loads")]
    StaleSnapshot { attempts: u32 },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
